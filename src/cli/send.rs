//! Send command implementation.

use crate::cli::args::SendArgs;
use crate::core::pipeline;
use crate::error::Result;
use crate::storage::ResolvedConfig;

/// Execute the send command.
///
/// Prints the confirmation summary on success. With `--dry-run` the
/// assembled payload is printed as JSON instead and nothing is delivered.
///
/// # Errors
///
/// Propagates every pipeline failure; `main` renders fix suggestions.
pub async fn execute(args: &SendArgs) -> Result<()> {
    args.validate()?;

    let config = ResolvedConfig::resolve(Some(args))?;
    tracing::debug!(
        webhook_url = %config.sources.webhook_url,
        user = %config.sources.user,
        "Resolved configuration"
    );

    let note = args.note.as_deref().unwrap_or("");
    let outcome = pipeline::send_usage(&config, note, args.date, args.dry_run).await?;

    if outcome.delivered {
        println!("{}", outcome.summary());
    } else {
        // Dry run: the payload itself is the result, on stdout for piping.
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        eprintln!("Dry run: nothing was sent.");
    }

    Ok(())
}
