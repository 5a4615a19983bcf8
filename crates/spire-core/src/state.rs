//! Persisted post-sync snapshot and drift detection

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spire_fs::{JsonStore, NormalizedPath, SpirePath};

use crate::Result;
use crate::snapshot::PayloadSnapshot;

/// On-disk shape of the sync state file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    hashes: Option<PayloadSnapshot>,
}

/// Reads and writes the snapshot recorded after the last successful sync.
///
/// The state lives in `.spire-sync-state.json` inside the payload directory
/// and is always rewritten whole.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
    store: JsonStore,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            store: JsonStore::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.dir.join(SpirePath::SyncState.as_str()))
    }

    /// Load the stored snapshot, or `None` before the first sync.
    pub fn read(&self) -> Result<Option<PayloadSnapshot>> {
        let document: Option<StateDocument> = self.store.load(&self.state_path())?;
        Ok(document.map(|doc| doc.hashes.unwrap_or_default()))
    }

    /// Replace the stored snapshot.
    pub fn write(&self, snapshot: &PayloadSnapshot) -> Result<()> {
        let document = StateDocument {
            hashes: Some(snapshot.clone()),
        };
        self.store.save(&self.state_path(), &document)?;
        tracing::debug!("Recorded sync state with {} files", snapshot.len());
        Ok(())
    }

    /// Paths that differ between the live tree and the stored snapshot.
    ///
    /// Modified, deleted and newly added files are all reported. Returns an
    /// empty list when no state has been recorded yet.
    pub fn detect_dirty(&self) -> Result<Vec<String>> {
        let live = PayloadSnapshot::capture(&self.dir)?;
        let Some(stored) = self.read()? else {
            return Ok(Vec::new());
        };

        Ok(PayloadSnapshot::changed_paths(&stored, &live))
    }
}
