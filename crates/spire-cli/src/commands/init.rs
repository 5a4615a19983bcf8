//! Init command implementation
//!
//! Creates `.methodology` in a project and projects its templates.

use std::path::Path;

use colored::Colorize;
use spire_core::{LifecyclePhase, SourceConfig, SyncEngine};
use spire_fs::SpirePath;

use super::print_outcome;
use crate::error::{CliError, Result};
use crate::gitignore;

/// Run the init command
pub fn run_init(path: &Path, config: SourceConfig) -> Result<()> {
    println!(
        "{} Initializing {}...",
        "=>".blue().bold(),
        SpirePath::PayloadDir.as_str().cyan()
    );

    let engine = SyncEngine::new(path, config);
    let mut report = engine.initialize_payload().map_err(|e| match e {
        spire_core::Error::AlreadyInitialized { .. } => {
            CliError::user(format!("Already initialized: {} exists", SpirePath::PayloadDir))
        }
        other => other.into(),
    })?;

    tracing::info!(
        "Initialized {} files from {}",
        report.files,
        report.source.tarball_url
    );

    // Ignored before projecting: a failed projection leaves an ignored payload
    gitignore::ensure_entry(path, &format!("{}/", SpirePath::PayloadDir))?;
    report.projection = engine.project(LifecyclePhase::Init, &[])?;

    for outcome in &report.projection.outcomes {
        print_outcome(outcome, true);
    }

    println!(
        "{} initialized {}",
        "OK".green().bold(),
        SpirePath::PayloadDir.as_str()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_test_utils::{MethodologyFixture, TestProject};

    fn config(fixture: &MethodologyFixture) -> SourceConfig {
        SourceConfig::default().with_local_dir(fixture.root())
    }

    #[test]
    fn test_init_creates_payload_and_gitignore() {
        let project = TestProject::new();
        let fixture = MethodologyFixture::standard();

        run_init(project.root(), config(&fixture)).unwrap();

        project.assert_file_exists(".methodology/project_root/manifest.json");
        project.assert_file_exists("AGENTS.md");
        assert_eq!(project.read(".gitignore"), ".methodology/\n");
    }

    #[test]
    fn test_init_twice_is_user_error() {
        let project = TestProject::new();
        let fixture = MethodologyFixture::standard();
        run_init(project.root(), config(&fixture)).unwrap();

        let err = run_init(project.root(), config(&fixture)).unwrap_err();

        assert!(matches!(err, CliError::User { .. }));
        assert_eq!(err.to_string(), "Already initialized: .methodology exists");
        assert_eq!(project.read(".gitignore"), ".methodology/\n");
    }

    #[test]
    fn test_init_ignores_payload_before_projecting() {
        let project = TestProject::new();
        let fixture = MethodologyFixture::standard();
        fixture.write(
            "project_root/manifest.json",
            r#"{"version": 1, "mappings": [{"source": "../x", "destination": "x", "on_init": "if_missing", "on_update": "if_missing"}]}"#,
        );

        let err = run_init(project.root(), config(&fixture)).unwrap_err();

        assert!(matches!(err, CliError::Core(_)), "{err}");
        project.assert_file_exists(".methodology/project_root/manifest.json");
        project.assert_file_not_exists("x");
        assert_eq!(project.read(".gitignore"), ".methodology/\n");
    }

    #[test]
    fn test_init_keeps_existing_gitignore_lines() {
        let project = TestProject::new();
        project.write(".gitignore", "target/");
        let fixture = MethodologyFixture::standard();

        run_init(project.root(), config(&fixture)).unwrap();

        assert_eq!(project.read(".gitignore"), "target/\n.methodology/\n");
    }
}
