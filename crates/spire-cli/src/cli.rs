//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// Spire - keep a project's SDD methodology in sync with upstream
#[derive(Parser, Debug)]
#[command(name = "spire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize project methodology
    ///
    /// Downloads the methodology payload into .methodology/, copies the
    /// project-root templates that do not exist yet and ignores
    /// .methodology/ in git.
    ///
    /// Set SPIRE_METHODOLOGY_DIR to use a local payload directory instead.
    Init,

    /// Update local methodology
    ///
    /// Re-syncs .methodology/ from the source it was initialized from.
    /// Refuses to run over local edits unless confirmed.
    ///
    /// Examples:
    ///   spire update          # Prompt if .methodology has local edits
    ///   spire update --yes    # Overwrite local edits without asking
    Update {
        /// Proceed even if .methodology has local edits
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["spire"]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_init() {
        let cli = Cli::parse_from(["spire", "init"]);
        assert_eq!(cli.command, Some(Commands::Init));
    }

    #[test]
    fn parse_update_defaults_to_prompting() {
        let cli = Cli::parse_from(["spire", "update"]);
        assert_eq!(cli.command, Some(Commands::Update { yes: false }));
    }

    #[test]
    fn parse_update_yes() {
        for flag in ["--yes", "-y"] {
            let cli = Cli::parse_from(["spire", "update", flag]);
            assert_eq!(cli.command, Some(Commands::Update { yes: true }));
        }
    }

    #[test]
    fn parse_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["spire", "update", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["spire", "status"]).is_err());
    }
}
