//! Error types for spire-core

use std::path::PathBuf;

/// Result type for spire-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Callers that need to react to the cause of a failure (tests, the CLI)
/// match on this instead of on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Filesystem read/write failure or an unmet precondition on the payload directory
    Io,
    /// Structurally invalid JSON document
    Schema,
    /// Well-formed but semantically invalid manifest, or an unsafe path
    Validation,
    /// Connection failure, timeout or non-success HTTP status
    Network,
    /// Archive that is not a valid, safe methodology payload
    Integrity,
}

/// Errors that can occur in spire-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error from spire-fs
    #[error(transparent)]
    Fs(#[from] spire_fs::Error),

    #[error("Already initialized: {} exists", path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("Not initialized: {} does not exist", path.display())]
    NotInitialized { path: PathBuf },

    #[error("{} exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Methodology source {} is not a directory", path.display())]
    SourceNotADirectory { path: PathBuf },

    #[error("Manifest schema error in {}: {message}", path.display())]
    ManifestSchema { path: PathBuf, message: String },

    #[error("Manifest validation error ({field}): {message}")]
    ManifestValidation { field: String, message: String },

    #[error("Path {path} escapes {}", root.display())]
    PathEscape { path: String, root: PathBuf },

    #[error("Failed to download {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to download {url}: unexpected status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid methodology entry path {entry:?}")]
    ArchiveTraversal { entry: String },

    #[error("Failed to read methodology archive: {message}")]
    ArchiveRead { message: String },

    #[error("Tarball did not contain a methodology payload")]
    ArchiveEmpty,

    #[error("Methodology payload missing {path}")]
    MissingManifest { path: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The closed category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. }
            | Self::AlreadyInitialized { .. }
            | Self::NotInitialized { .. }
            | Self::NotADirectory { .. }
            | Self::SourceNotADirectory { .. } => ErrorKind::Io,
            Self::Fs(spire_fs::Error::Parse { .. }) => ErrorKind::Schema,
            Self::Fs(_) => ErrorKind::Io,
            Self::ManifestSchema { .. } => ErrorKind::Schema,
            Self::ManifestValidation { .. } | Self::PathEscape { .. } => ErrorKind::Validation,
            Self::Network { .. } | Self::HttpStatus { .. } => ErrorKind::Network,
            Self::ArchiveTraversal { .. }
            | Self::ArchiveRead { .. }
            | Self::ArchiveEmpty
            | Self::MissingManifest { .. } => ErrorKind::Integrity,
        }
    }
}
