//! SyncEngine implementation
//!
//! The SyncEngine coordinates the local payload copy (`.methodology`), the
//! canonical source it came from, and the project-root files projected
//! from it.

use std::fs;
use std::path::{Path, PathBuf};

use spire_fs::{SpirePath, io};

use super::report::{InitReport, UpdateReport};
use crate::manifest::ProjectRootManifest;
use crate::projection::{self, LifecyclePhase, ProjectionApplier, ProjectionReport};
use crate::snapshot::PayloadSnapshot;
use crate::source::{SourceConfig, SourceMetadata, SourceResolver};
use crate::state::StateStore;
use crate::{Error, Result};

/// Engine for synchronizing the methodology payload
///
/// The SyncEngine provides three main operations:
/// - **initialize**: create `.methodology` from the default source and
///   project it with the `on_init` policies
/// - **detect_dirty**: list local edits made since the last sync
/// - **update**: re-sync from the recorded source and project with the
///   `on_update` policies
pub struct SyncEngine {
    /// Root path of the project
    root: PathBuf,
    resolver: SourceResolver,
}

impl SyncEngine {
    /// Create a new SyncEngine for the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, config: SourceConfig) -> Self {
        Self::with_resolver(project_root, SourceResolver::new(config))
    }

    /// Create a SyncEngine with a preconfigured resolver.
    pub fn with_resolver(project_root: impl Into<PathBuf>, resolver: SourceResolver) -> Self {
        Self {
            root: project_root.into(),
            resolver,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.root
    }

    /// The local payload copy, `<root>/.methodology`.
    pub fn payload_dir(&self) -> PathBuf {
        self.root.join(SpirePath::PayloadDir.as_str())
    }

    /// Path to `project_root/manifest.json` inside the local payload copy.
    pub fn manifest_path(&self) -> PathBuf {
        self.payload_dir()
            .join(SpirePath::ProjectRootDir.as_str())
            .join(SpirePath::Manifest.as_str())
    }

    pub fn state_store(&self) -> StateStore {
        StateStore::new(self.payload_dir())
    }

    /// Overlay `source_dir` onto the local payload copy.
    ///
    /// Snapshots the copy before and after the raw copy, records the after
    /// snapshot as the new sync state and returns the changed paths. Local
    /// files that the source does not contain are kept. A failure to
    /// snapshot the copy aborts before anything is written.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot, the copy, or the state write fails.
    /// Files copied before a failure are not rolled back.
    pub fn overlay(&self, source_dir: &Path) -> Result<Vec<String>> {
        let payload = self.payload_dir();

        let before = if payload.exists() {
            PayloadSnapshot::capture(&payload)?
        } else {
            PayloadSnapshot::default()
        };

        let copied = io::copy_tree(source_dir, &payload)?;
        let after = PayloadSnapshot::capture(&payload)?;
        self.state_store().write(&after)?;

        let changed = PayloadSnapshot::changed_paths(&before, &after);
        tracing::info!(
            "Overlaid {} files from {}; {} changed",
            copied,
            source_dir.display(),
            changed.len()
        );
        Ok(changed)
    }

    /// Create `.methodology` from the configured default source.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::AlreadyInitialized`] if `.methodology` exists,
    /// and with resolver, overlay or projection errors otherwise.
    pub fn initialize(&self) -> Result<InitReport> {
        let mut report = self.initialize_payload()?;
        report.projection = self.project(LifecyclePhase::Init, &[])?;
        Ok(report)
    }

    /// Create `.methodology` and record its source without projecting.
    ///
    /// The returned report has an empty projection. Callers that need to act
    /// between the payload copy and the projection (the CLI ignores the
    /// payload in `.gitignore` there) finish with [`SyncEngine::project`].
    pub fn initialize_payload(&self) -> Result<InitReport> {
        let payload = self.payload_dir();
        match fs::symlink_metadata(&payload) {
            Ok(_) => return Err(Error::AlreadyInitialized { path: payload }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&payload, e)),
        }

        let metadata = self.resolver.config().default_metadata();
        let files = {
            let source = self.resolver.resolve(&metadata)?;
            self.overlay(source.path())?.len()
        };

        let metadata = metadata.stamped_now();
        metadata.write(&payload)?;

        Ok(InitReport {
            payload_dir: payload,
            files,
            source: metadata,
            projection: ProjectionReport::default(),
        })
    }

    /// Paths in `.methodology` edited, added or removed since the last sync.
    pub fn detect_dirty(&self) -> Result<Vec<String>> {
        self.require_payload_dir()?;
        self.state_store().detect_dirty()
    }

    /// Re-sync `.methodology` from its recorded source.
    ///
    /// Uses the stored source metadata when present, else the configured
    /// defaults. Does not check for local edits; callers gate on
    /// [`SyncEngine::detect_dirty`] first.
    pub fn update(&self) -> Result<UpdateReport> {
        self.require_payload_dir()?;
        let payload = self.payload_dir();

        let config = self.resolver.config();
        let metadata = match SourceMetadata::read(&payload)? {
            Some(stored) => config.normalize(stored),
            None => config.default_metadata(),
        };

        let changed = {
            let source = self.resolver.resolve(&metadata)?;
            self.overlay(source.path())?
        };

        let metadata = metadata.stamped_now();
        metadata.write(&payload)?;

        let projection = self.project(LifecyclePhase::Update, &changed)?;
        Ok(UpdateReport {
            changed,
            source: metadata,
            projection,
        })
    }

    fn require_payload_dir(&self) -> Result<()> {
        let payload = self.payload_dir();
        match fs::metadata(&payload) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(Error::NotADirectory { path: payload }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotInitialized { path: payload })
            }
            Err(e) => Err(Error::io(&payload, e)),
        }
    }

    /// Project the local payload copy into the project root with the
    /// policies of `phase`. `changed` holds the payload-relative paths the
    /// last overlay changed.
    pub fn project(&self, phase: LifecyclePhase, changed: &[String]) -> Result<ProjectionReport> {
        let payload = self.payload_dir();
        let manifest = ProjectRootManifest::load(&self.manifest_path())?;
        let source_root = payload.join(SpirePath::ProjectRootDir.as_str());

        let actions = projection::plan(&manifest, &source_root, phase)?;
        ProjectionApplier::new(&self.root, &payload).apply(&actions, changed)
    }
}
