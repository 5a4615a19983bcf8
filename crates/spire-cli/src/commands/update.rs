//! Update command implementation
//!
//! Re-syncs `.methodology` from its recorded source, guarding local edits.

use std::io::IsTerminal;
use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use spire_core::{SourceConfig, SyncEngine};
use spire_fs::SpirePath;

use super::print_outcome;
use crate::error::{CliError, Result};

/// Run the update command
///
/// Local edits in `.methodology` are listed first. Without `assume_yes` the
/// user is asked to confirm when stdin is a terminal; otherwise the update
/// is refused.
pub fn run_update(path: &Path, config: SourceConfig, assume_yes: bool) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    run_update_with(path, config, assume_yes, interactive, confirm_overwrite)
}

/// [`run_update`] with the terminal check and the prompt supplied by the caller.
pub fn run_update_with(
    path: &Path,
    config: SourceConfig,
    assume_yes: bool,
    interactive: bool,
    confirm: impl FnOnce() -> Result<bool>,
) -> Result<()> {
    let engine = SyncEngine::new(path, config);

    let dirty = engine.detect_dirty().map_err(|e| match e {
        spire_core::Error::NotInitialized { .. } => CliError::user("Run spire init first."),
        other => other.into(),
    })?;

    if !dirty.is_empty() {
        eprintln!(
            "{} local edits detected in {}:",
            "warning:".yellow().bold(),
            SpirePath::PayloadDir
        );
        for file in &dirty {
            eprintln!("- {}", file);
        }

        if !assume_yes {
            if !interactive {
                return Err(CliError::user(
                    "non-interactive mode: stash or remove local edits first.",
                ));
            }
            if !confirm()? {
                return Err(CliError::user("stash or remove local edits first."));
            }
        }
    }

    println!(
        "{} Updating {}...",
        "=>".blue().bold(),
        SpirePath::PayloadDir.as_str().cyan()
    );
    let report = engine.update()?;
    tracing::info!("Updated from {}", report.source.tarball_url);

    println!(
        "{} updated {}",
        "OK".green().bold(),
        SpirePath::PayloadDir.as_str()
    );
    if report.is_unchanged() {
        println!("no methodology file changes detected");
    } else {
        println!("changed files:");
        for file in &report.changed {
            println!("- {}", file);
        }
    }

    for outcome in &report.projection.outcomes {
        print_outcome(outcome, false);
    }

    Ok(())
}

fn confirm_overwrite() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Continue?")
        .default(false)
        .interact()?)
}
