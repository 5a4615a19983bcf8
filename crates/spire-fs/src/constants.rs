//! Fixed names used by the payload layout and its bookkeeping.

use std::path::Path;

/// Well-known paths of the methodology payload and the project it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpirePath {
    /// The `.methodology` directory (local payload copy inside the project)
    PayloadDir,
    /// The `project_root` directory (payload subtree projected into the project root)
    ProjectRootDir,
    /// The `manifest.json` file inside `project_root`
    Manifest,
    /// The `methodology` directory inside a source tarball
    ArchiveSubtree,
    /// The `.spire-sync-state.json` file (post-sync snapshot)
    SyncState,
    /// The `.spire-source.json` file (source metadata)
    SourceMetadata,
    /// The `.opencode` directory (system-owned config in the project root)
    ManagedConfig,
}

impl SpirePath {
    /// Files written by the sync engine itself; never part of a snapshot.
    pub const BOOKKEEPING: [SpirePath; 2] = [SpirePath::SyncState, SpirePath::SourceMetadata];

    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PayloadDir => ".methodology",
            Self::ProjectRootDir => "project_root",
            Self::Manifest => "manifest.json",
            Self::ArchiveSubtree => "methodology",
            Self::SyncState => ".spire-sync-state.json",
            Self::SourceMetadata => ".spire-source.json",
            Self::ManagedConfig => ".opencode",
        }
    }

    /// Whether a root-relative path names one of the bookkeeping files.
    pub fn is_bookkeeping(relative: &str) -> bool {
        Self::BOOKKEEPING.iter().any(|p| p.as_str() == relative)
    }
}

impl AsRef<Path> for SpirePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for SpirePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SpirePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
