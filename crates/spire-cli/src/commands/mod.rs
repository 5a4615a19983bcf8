//! Command implementations for spire-cli

pub mod init;
pub mod update;

use colored::Colorize;
use spire_core::ProjectionOutcome;

pub use init::run_init;
pub use update::run_update;

/// Print one projection outcome line.
///
/// `Skipped` lines are only printed when `show_skipped` is set.
fn print_outcome(outcome: &ProjectionOutcome, show_skipped: bool) {
    let line = outcome.to_string();
    match outcome {
        ProjectionOutcome::Created { .. } => println!("{}", line.green()),
        ProjectionOutcome::Updated { .. } => println!("{}", line.cyan()),
        ProjectionOutcome::Skipped { .. } if show_skipped => println!("{}", line.dimmed()),
        ProjectionOutcome::Skipped { .. } => {}
        ProjectionOutcome::Notice { .. } => println!("{}", line.yellow()),
    }
}
