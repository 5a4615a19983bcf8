//! Spire CLI
//!
//! Initializes and updates a project's `.methodology` payload.

mod cli;
mod commands;
mod error;
mod gitignore;

use clap::Parser;
use colored::Colorize;
use spire_core::SourceConfig;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} SDD methodology CLI", "spire".green().bold());
            println!();
            println!("Run {} for available commands.", "spire --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` controls the filter, defaulting to `warn`; `--verbose` forces `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = SourceConfig::from_env();
    tracing::debug!("Source configuration: {:?}", config);

    match cmd {
        Commands::Init => commands::run_init(&cwd, config),
        Commands::Update { yes } => commands::run_update(&cwd, config, yes),
    }
}
