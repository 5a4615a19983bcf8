//! Reports returned by the sync flows

use std::path::PathBuf;

use crate::projection::ProjectionReport;
use crate::source::SourceMetadata;

/// Result of [`SyncEngine::initialize`](super::SyncEngine::initialize).
#[derive(Debug, Clone)]
pub struct InitReport {
    /// The created payload directory
    pub payload_dir: PathBuf,
    /// Number of payload files now present in the local copy
    pub files: usize,
    /// Source the payload was taken from, with its fetch time
    pub source: SourceMetadata,
    pub projection: ProjectionReport,
}

/// Result of [`SyncEngine::update`](super::SyncEngine::update).
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// Payload-relative paths changed by the overlay, sorted
    pub changed: Vec<String>,
    /// Source the payload was taken from, with its fetch time
    pub source: SourceMetadata,
    pub projection: ProjectionReport,
}

impl UpdateReport {
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}
