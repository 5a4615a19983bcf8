//! Resolving manifest rules against a concrete payload root

use std::path::{Path, PathBuf};

use spire_fs::NormalizedPath;

use crate::manifest::{CopyPolicy, ProjectRootManifest};
use crate::{Error, Result};

/// Which policy column of a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// First-time setup (`on_init`)
    Init,
    /// Subsequent sync (`on_update`)
    Update,
}

/// A rule resolved for one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionAction {
    /// Absolute path of the payload file
    pub source: PathBuf,
    /// Destination relative to the project root
    pub destination: NormalizedPath,
    /// Policy effective for this phase
    pub policy: CopyPolicy,
    pub notify_if_source_changed: bool,
}

/// Build the actions for `phase`, with sources resolved under `source_root`.
///
/// The manifest is re-validated, and every joined source must still lie
/// under `source_root`.
pub fn plan(
    manifest: &ProjectRootManifest,
    source_root: &Path,
    phase: LifecyclePhase,
) -> Result<Vec<ProjectionAction>> {
    manifest.validate()?;

    let root = NormalizedPath::new(source_root);
    manifest
        .rules
        .iter()
        .map(|rule| {
            let source = root.join(rule.source.as_str());
            if !source.starts_with(&root) || source == root {
                return Err(Error::PathEscape {
                    path: rule.source.to_string(),
                    root: source_root.to_path_buf(),
                });
            }

            let policy = match phase {
                LifecyclePhase::Init => rule.on_init,
                LifecyclePhase::Update => rule.on_update,
            };

            Ok(ProjectionAction {
                source: source.to_native(),
                destination: rule.destination.clone(),
                policy,
                notify_if_source_changed: rule.notify_if_source_changed,
            })
        })
        .collect()
}
