//! E2E tests for `curt setup`.
//!
//! Without a TTY every change must arrive as a flag, so these tests drive
//! the compiled binary through its non-interactive contract: flag-driven
//! saves, the `--yes` confirmation gate, and the Claude Code command-file
//! install.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::logger::TestLogger;

const WEBHOOK_URL: &str = "https://n8n.example.com/webhook/usage";

/// The curt binary, isolated from the host's real configuration.
fn curt_cmd() -> Command {
    let mut cmd = Command::cargo_bin("curt").expect("curt binary should build");
    cmd.env_remove("N8N_WEBHOOK_URL")
        .env_remove("CCUSAGE_USER_ID")
        .env_remove("RUST_LOG")
        .env_remove("CURT_LOG")
        .env_remove("CURT_LOG_FORMAT")
        .env_remove("CURT_LOG_FILE");
    cmd
}

#[cfg(unix)]
#[test]
fn flags_with_yes_write_config_and_command_file() {
    let log = TestLogger::new("flags_with_yes_write_config_and_command_file");
    log.phase("setup");

    let home = TempDir::new().expect("temp home");
    let config_path = home.path().join("curt/config.toml");

    log.phase("execute");
    curt_cmd()
        .env("HOME", home.path())
        .env("CURT_CONFIG", &config_path)
        .args(["setup", "--webhook-url", WEBHOOK_URL, "--user", "jane", "--yes"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    log.phase("verify");
    let saved = std::fs::read_to_string(&config_path).expect("config should be written");
    assert!(saved.contains(WEBHOOK_URL), "config missing URL:\n{saved}");
    assert!(saved.contains("jane"), "config missing user:\n{saved}");

    let command_file = home.path().join(".claude/commands/send-usage.md");
    let body =
        std::fs::read_to_string(&command_file).expect("command file should be installed");
    assert!(body.contains("send-usage"));
    assert!(body.contains("$ARGUMENTS"));
    log.finish_ok();
}

#[cfg(unix)]
#[test]
fn missing_flag_keeps_the_saved_value() {
    let log = TestLogger::new("missing_flag_keeps_the_saved_value");
    log.phase("setup");

    let home = TempDir::new().expect("temp home");
    let config_path = home.path().join("curt/config.toml");
    std::fs::create_dir_all(config_path.parent().expect("config has a parent"))
        .expect("create config dir");
    std::fs::write(
        &config_path,
        format!("[webhook]\nurl = \"{WEBHOOK_URL}\"\n\n[report]\nuser = \"bob\"\n"),
    )
    .expect("seed config");

    log.phase("execute");
    // Only the user changes; the URL must survive untouched.
    curt_cmd()
        .env("HOME", home.path())
        .env("CURT_CONFIG", &config_path)
        .args(["setup", "--user", "jane", "--yes"])
        .assert()
        .success();

    log.phase("verify");
    let saved = std::fs::read_to_string(&config_path).expect("config should still exist");
    assert!(saved.contains(WEBHOOK_URL), "URL was lost:\n{saved}");
    assert!(saved.contains("jane"), "user was not updated:\n{saved}");
    assert!(!saved.contains("bob"), "old user survived:\n{saved}");
    log.finish_ok();
}

#[test]
fn refuses_to_save_without_yes_when_not_interactive() {
    let log = TestLogger::new("refuses_to_save_without_yes_when_not_interactive");
    log.phase("setup");

    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    log.phase("execute");
    curt_cmd()
        .env("CURT_CONFIG", &config_path)
        .args(["setup", "--webhook-url", WEBHOOK_URL, "--user", "jane"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("--yes"));

    log.phase("verify");
    assert!(!config_path.exists(), "nothing should be written");
    log.finish_ok();
}

#[test]
fn needs_a_webhook_url_from_somewhere() {
    let log = TestLogger::new("needs_a_webhook_url_from_somewhere");
    log.phase("setup");

    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    log.phase("execute");
    curt_cmd()
        .env("CURT_CONFIG", &config_path)
        .args(["setup", "--user", "jane", "--yes"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("--webhook-url"));

    log.phase("verify");
    assert!(!config_path.exists());
    log.finish_ok();
}

#[test]
fn rejects_a_non_http_url() {
    let log = TestLogger::new("rejects_a_non_http_url");
    log.phase("setup");

    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    log.phase("execute");
    curt_cmd()
        .env("CURT_CONFIG", &config_path)
        .args(["setup", "--webhook-url", "n8n.example.com/hook", "--user", "jane", "--yes"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("http"));

    log.phase("verify");
    assert!(!config_path.exists(), "an invalid URL must not be saved");
    log.finish_ok();
}
