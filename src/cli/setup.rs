//! Interactive configuration setup.
//!
//! Walks through the two settings a report cannot ship without, the webhook
//! URL and the reporter name, validates the result and writes the config
//! file. Every prompt can be answered from flags, so the same command works
//! in scripts: `curt setup --webhook-url .. --user .. --yes`.
//!
//! Dialog goes to stderr and answers come from stdin; stdout stays silent.

use std::io::{self, BufRead, Write};

use crate::cli::args::SetupArgs;
use crate::error::{CurtError, Result};
use crate::storage::{AppPaths, Config};
use crate::util::env::is_interactive;

/// File name of the Claude Code slash command installed by setup.
const COMMAND_FILE_NAME: &str = "send-usage.md";

/// Body of the installed `/send-usage` command. Claude Code substitutes
/// `$ARGUMENTS` with whatever the user typed after the command name.
const COMMAND_FILE_BODY: &str = "\
---
description: Send today's Claude token usage to the team spreadsheet
---

Use the send-usage MCP tool to report today's token usage to the team
spreadsheet.

Pass this as the note argument, omitting the note when it is empty:
$ARGUMENTS
";

/// Execute the setup command.
pub fn execute(args: &SetupArgs) -> Result<()> {
    let interactive = is_interactive();
    let path = Config::effective_path();
    let mut config = Config::load_from(&path)?;

    eprintln!("curt setup");
    eprintln!("Config file: {}", path.display());
    eprintln!();

    if let Some(url) = resolve_setting(
        "Webhook URL",
        "the n8n webhook reports are POSTed to",
        args.webhook_url.as_deref(),
        config.webhook.url.as_deref(),
        interactive,
    )? {
        config.webhook.url = Some(url);
    }

    if let Some(user) = resolve_setting(
        "Your name",
        "shown next to each report in the spreadsheet",
        args.user.as_deref(),
        config.report.user.as_deref(),
        interactive,
    )? {
        config.report.user = Some(user);
    }

    if config.webhook.url.is_none() {
        return Err(CurtError::Config(
            "setup needs a webhook URL; pass --webhook-url or run from a terminal".to_string(),
        ));
    }

    config.validate()?;

    if !args.yes {
        if !interactive {
            return Err(CurtError::Config(format!(
                "refusing to write {} without confirmation; pass --yes",
                path.display()
            )));
        }
        if !confirm("Save this configuration? [y/N]")? {
            eprintln!("Nothing saved.");
            return Ok(());
        }
    }

    config.save_to(&path)?;
    eprintln!("Saved {}", path.display());

    install_claude_command(args, interactive)?;

    eprintln!();
    eprintln!("Done. Try `curt send --dry-run`, or register the MCP server:");
    eprintln!("  claude mcp add curt -- curt serve");
    Ok(())
}

/// Resolve one setting from its flag, the prompt, or the existing config.
///
/// Returns `None` when the value is unchanged. Without a terminal every
/// change must be spelled out as a flag, so the prompt is skipped.
fn resolve_setting(
    label: &str,
    hint: &str,
    flag: Option<&str>,
    current: Option<&str>,
    interactive: bool,
) -> Result<Option<String>> {
    if let Some(value) = flag {
        return Ok(Some(value.trim().to_string()));
    }
    if !interactive {
        return Ok(None);
    }
    prompt_value(label, hint, current)
}

/// Prompt on stderr and read one line from stdin.
///
/// An empty answer keeps the current value, so re-running setup only changes
/// what the user retypes.
fn prompt_value(label: &str, hint: &str, current: Option<&str>) -> Result<Option<String>> {
    eprintln!("{label} ({hint})");
    match current {
        Some(value) => eprint!("  [{value}]: "),
        None => eprint!("  : "),
    }
    io::stderr().flush()?;

    let answer = read_answer()?;
    if answer.is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer))
    }
}

/// Ask a yes/no question on stderr. `y` and `yes` in any case count as yes.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} ");
    io::stderr().flush()?;

    let answer = read_answer()?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn read_answer() -> Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Install the `/send-usage` slash command for Claude Code.
///
/// Offered after a successful save; `--yes` answers the offer too.
fn install_claude_command(args: &SetupArgs, interactive: bool) -> Result<()> {
    let Some(dir) = AppPaths::claude_commands_dir() else {
        return Ok(());
    };
    let target = dir.join(COMMAND_FILE_NAME);

    let wanted = if args.yes {
        true
    } else if interactive {
        confirm(&format!(
            "Install the /send-usage command for Claude Code at {}? [y/N]",
            target.display()
        ))?
    } else {
        false
    };
    if !wanted {
        return Ok(());
    }

    std::fs::create_dir_all(&dir)?;
    std::fs::write(&target, COMMAND_FILE_BODY)?;
    eprintln!("Installed {}", target.display());
    Ok(())
}
