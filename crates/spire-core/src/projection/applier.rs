//! Applying projection actions to the project root

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use spire_fs::{NormalizedPath, SpirePath, io};

use super::ProjectionAction;
use crate::manifest::CopyPolicy;
use crate::{Error, Result};

/// What to do with one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the source over (or into) the destination
    Copy,
    /// Leave the destination alone
    Skip,
    /// Leave the destination alone and report the upstream change
    Notify,
}

/// The create/update/skip/notify matrix.
///
/// `NeverOverwrite` is absolute only outside the managed prefix: a changed
/// source under it is copied over an existing destination.
pub fn decide(
    exists: bool,
    policy: CopyPolicy,
    managed: bool,
    source_changed: bool,
    notify: bool,
) -> Decision {
    match (exists, policy) {
        (false, _) => Decision::Copy,
        (true, CopyPolicy::IfMissing) => Decision::Skip,
        (true, CopyPolicy::NeverOverwrite) if managed && source_changed => Decision::Copy,
        (true, CopyPolicy::NeverOverwrite) if notify && source_changed => Decision::Notify,
        (true, CopyPolicy::NeverOverwrite) => Decision::Skip,
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Created { destination: NormalizedPath },
    Updated { destination: NormalizedPath },
    Skipped { destination: NormalizedPath },
    /// Kept an existing destination although its source changed
    Notice {
        /// Payload-relative path of the changed source
        source: String,
        destination: NormalizedPath,
    },
}

impl ProjectionOutcome {
    pub fn destination(&self) -> &NormalizedPath {
        match self {
            Self::Created { destination }
            | Self::Updated { destination }
            | Self::Skipped { destination }
            | Self::Notice { destination, .. } => destination,
        }
    }
}

impl fmt::Display for ProjectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { destination } => write!(f, "created: {destination}"),
            Self::Updated { destination } => write!(f, "updated: {destination}"),
            Self::Skipped { destination } => write!(f, "skipped existing: {destination}"),
            Self::Notice {
                source,
                destination,
            } => write!(
                f,
                "notice: upstream {source} changed; kept existing {destination}"
            ),
        }
    }
}

/// Outcomes of one projection run, in action order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    pub outcomes: Vec<ProjectionOutcome>,
}

impl ProjectionReport {
    pub fn created(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.outcomes.iter().filter_map(|o| match o {
            ProjectionOutcome::Created { destination } => Some(destination),
            _ => None,
        })
    }

    pub fn updated(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.outcomes.iter().filter_map(|o| match o {
            ProjectionOutcome::Updated { destination } => Some(destination),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.outcomes.iter().filter_map(|o| match o {
            ProjectionOutcome::Skipped { destination } => Some(destination),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &ProjectionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ProjectionOutcome::Notice { .. }))
    }
}

/// Writes planned actions into a project root.
#[derive(Debug, Clone)]
pub struct ProjectionApplier {
    project_root: PathBuf,
    payload_dir: PathBuf,
    managed_prefix: NormalizedPath,
}

impl ProjectionApplier {
    /// `payload_dir` is the directory that changed-file keys are relative to.
    pub fn new(project_root: impl Into<PathBuf>, payload_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            payload_dir: payload_dir.into(),
            managed_prefix: NormalizedPath::new(SpirePath::ManagedConfig.as_str()),
        }
    }

    pub fn with_managed_prefix(mut self, prefix: &str) -> Self {
        self.managed_prefix = NormalizedPath::new(prefix);
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Whether a project-relative destination lies under the managed prefix.
    pub fn is_managed(&self, destination: &NormalizedPath) -> bool {
        destination.starts_with(&self.managed_prefix) && *destination != self.managed_prefix
    }

    /// Apply each action independently.
    ///
    /// `changed` holds payload-relative paths changed by the current sync.
    /// A failure stops at that action; earlier writes stay in place.
    pub fn apply(&self, actions: &[ProjectionAction], changed: &[String]) -> Result<ProjectionReport> {
        let changed: HashSet<&str> = changed.iter().map(String::as_str).collect();
        let root = NormalizedPath::new(&self.project_root);
        let payload = NormalizedPath::new(&self.payload_dir);
        let mut report = ProjectionReport::default();

        for action in actions {
            let target = root.join(action.destination.as_str());
            if !target.starts_with(&root) || target == root {
                return Err(Error::PathEscape {
                    path: action.destination.to_string(),
                    root: self.project_root.clone(),
                });
            }

            let native = target.to_native();
            let exists = native.try_exists().map_err(|e| Error::io(&native, e))?;

            let source_key = NormalizedPath::new(&action.source)
                .strip_prefix(&payload)
                .map(|key| key.as_str().to_string());
            let source_changed = source_key
                .as_deref()
                .is_some_and(|key| changed.contains(key));

            let decision = decide(
                exists,
                action.policy,
                self.is_managed(&action.destination),
                source_changed,
                action.notify_if_source_changed,
            );
            tracing::debug!(
                "{}: exists={} policy={} changed={} -> {:?}",
                action.destination,
                exists,
                action.policy,
                source_changed,
                decision
            );

            let destination = action.destination.clone();
            let outcome = match decision {
                Decision::Copy => {
                    io::copy_file(&action.source, &target)?;
                    if exists {
                        ProjectionOutcome::Updated { destination }
                    } else {
                        ProjectionOutcome::Created { destination }
                    }
                }
                Decision::Skip => ProjectionOutcome::Skipped { destination },
                Decision::Notify => ProjectionOutcome::Notice {
                    source: source_key.unwrap_or_else(|| action.source.display().to_string()),
                    destination,
                },
            };
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}
