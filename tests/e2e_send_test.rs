//! E2E tests for `curt send`.
//!
//! Runs the compiled binary with a scripted ccusage and (where delivery is
//! exercised) a wiremock endpoint, verifying exit codes, the dry-run payload
//! on stdout, and the printed confirmation summary.

mod common;

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::Local;
use predicates::prelude::*;
use tempfile::TempDir;

use common::logger::TestLogger;

/// The curt binary, isolated from the host's real configuration.
fn curt_cmd() -> Command {
    let mut cmd = Command::cargo_bin("curt").expect("curt binary should build");
    cmd.env_remove("N8N_WEBHOOK_URL")
        .env_remove("CCUSAGE_USER_ID")
        .env_remove("RUST_LOG")
        .env_remove("CURT_LOG")
        .env_remove("CURT_LOG_FORMAT")
        .env_remove("CURT_LOG_FILE")
        .env("CURT_CONFIG", "/nonexistent/curt-e2e/config.toml");
    cmd
}

/// Write a config file pointing ccusage at a stub command.
fn write_config(dir: &Path, command: &str, url: Option<&str>) -> PathBuf {
    let path = dir.join("config.toml");
    let mut content = String::new();
    if let Some(url) = url {
        content.push_str(&format!("[webhook]\nurl = \"{url}\"\n\n"));
    }
    content.push_str(&format!("[ccusage]\ncommand = \"{command}\"\n"));
    std::fs::write(&path, content).expect("write config");
    path
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn send_without_configuration_exits_with_config_code() {
    let log = TestLogger::new("send_without_configuration_exits_with_config_code");
    log.phase("execute");

    curt_cmd()
        .arg("send")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("webhook URL is not configured"))
        .stderr(predicate::str::contains("[CURT-C001]"))
        .stderr(predicate::str::contains("curt setup"));

    log.finish_ok();
}

#[test]
fn send_with_missing_ccusage_exits_with_binary_code() {
    let log = TestLogger::new("send_with_missing_ccusage_exits_with_binary_code");
    log.phase("setup");

    let dir = TempDir::new().expect("temp dir");
    let config = write_config(
        dir.path(),
        "curt-e2e-no-such-binary",
        Some("https://n8n.example.com/webhook/usage"),
    );

    log.phase("execute");
    curt_cmd()
        .env("CURT_CONFIG", &config)
        .arg("send")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("curt-e2e-no-such-binary"))
        .stderr(predicate::str::contains("[CURT-E001]"));

    log.finish_ok();
}

#[test]
fn send_rejects_out_of_range_timeout() {
    let log = TestLogger::new("send_rejects_out_of_range_timeout");
    log.phase("execute");

    curt_cmd()
        .args(["send", "--timeout", "0"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("between 1 and 300"));

    log.finish_ok();
}

// =============================================================================
// Dry Run Tests
// =============================================================================

#[cfg(unix)]
#[test]
fn dry_run_prints_the_payload_on_stdout() {
    use curt::test_utils::{fixture, make_wide_usage_table, write_fake_ccusage};

    let log = TestLogger::new("dry_run_prints_the_payload_on_stdout");
    log.phase("setup");

    let today = Local::now().date_naive();
    let dir = TempDir::new().expect("temp dir");
    let script = write_fake_ccusage(dir.path(), &make_wide_usage_table(today));
    let config = write_config(dir.path(), &script.display().to_string(), None);

    log.phase("execute");
    let output = curt_cmd()
        .env("CURT_CONFIG", &config)
        .args(["send", "--dry-run", "--user", "jane", "--note", "standup"])
        .output()
        .expect("Failed to execute");

    log.phase("verify");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be the JSON payload");
    assert_eq!(payload["user"], "jane");
    assert_eq!(payload["note"], "standup");
    assert_eq!(payload["totalTokens"], fixture::TOTAL_TOKENS);
    assert_eq!(payload["cacheCreationInputTokens"], fixture::CACHE_CREATION_TOKENS);
    assert_eq!(payload["cacheReadInputTokens"], fixture::CACHE_READ_TOKENS);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Dry run: nothing was sent."));
    log.finish_ok();
}

#[cfg(unix)]
#[test]
fn date_flag_reports_a_past_day() {
    use curt::test_utils::{make_multi_day_usage_table, write_fake_ccusage};

    let log = TestLogger::new("date_flag_reports_a_past_day");
    log.phase("setup");

    let today = Local::now().date_naive();
    let yesterday = today.pred_opt().expect("today has a predecessor");
    let dir = TempDir::new().expect("temp dir");
    let script = write_fake_ccusage(dir.path(), &make_multi_day_usage_table(today));
    let config = write_config(dir.path(), &script.display().to_string(), None);

    log.phase("execute");
    let output = curt_cmd()
        .env("CURT_CONFIG", &config)
        .args([
            "send",
            "--dry-run",
            "--user",
            "jane",
            "--date",
            &yesterday.format("%Y-%m-%d").to_string(),
        ])
        .output()
        .expect("Failed to execute");

    log.phase("verify");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout))
            .expect("stdout should be the JSON payload");
    assert_eq!(payload["totalTokens"], 42_950);
    log.finish_ok();
}

#[cfg(unix)]
#[test]
fn day_without_usage_exits_with_data_code() {
    use curt::test_utils::{make_wide_usage_table, write_fake_ccusage};

    let log = TestLogger::new("day_without_usage_exits_with_data_code");
    log.phase("setup");

    let today = Local::now().date_naive();
    let yesterday = today.pred_opt().expect("today has a predecessor");
    let dir = TempDir::new().expect("temp dir");
    // Only today's row exists, but yesterday is requested.
    let script = write_fake_ccusage(dir.path(), &make_wide_usage_table(today));
    let config = write_config(dir.path(), &script.display().to_string(), None);

    log.phase("execute");
    curt_cmd()
        .env("CURT_CONFIG", &config)
        .args([
            "send",
            "--dry-run",
            "--date",
            &yesterday.format("%Y-%m-%d").to_string(),
        ])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("no usage data found"))
        .stderr(predicate::str::contains(
            &yesterday.format("%Y-%m-%d").to_string(),
        ));

    log.finish_ok();
}

// =============================================================================
// Delivery Tests
// =============================================================================

#[cfg(unix)]
#[tokio::test]
async fn send_delivers_and_prints_the_summary() {
    use curt::test_utils::{make_wide_usage_table, write_fake_ccusage};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let log = TestLogger::new("send_delivers_and_prints_the_summary");
    log.phase("setup");

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhook/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Workflow was started"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let today = Local::now().date_naive();
    let dir = TempDir::new().expect("temp dir");
    let script = write_fake_ccusage(dir.path(), &make_wide_usage_table(today));
    let config = write_config(
        dir.path(),
        &script.display().to_string(),
        Some(&format!("{}/webhook/usage", mock_server.uri())),
    );

    log.phase("execute");
    // assert_cmd is blocking; run the binary off the async runtime so the
    // mock server keeps serving.
    let output = tokio::task::spawn_blocking(move || {
        curt_cmd()
            .env("CURT_CONFIG", &config)
            .args(["send", "--user", "jane", "--note", "standup"])
            .output()
            .expect("Failed to execute")
    })
    .await
    .expect("binary task should not panic");

    log.phase("verify");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Token usage data sent successfully!"));
    assert!(stdout.contains("Total Tokens: 189,427"));
    assert!(stdout.contains("User: jane"));
    assert!(stdout.contains("Note: standup"));
    assert!(stdout.contains("Response from n8n: Workflow was started"));
    log.finish_ok();
}
