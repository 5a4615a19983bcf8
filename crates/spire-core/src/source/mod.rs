//! Acquiring the canonical methodology payload
//!
//! The payload comes either from a local directory (offline use and tests)
//! or from a gzipped tarball downloaded over HTTPS, of which only the
//! `methodology/` subtree is extracted.

mod config;
mod extract;
mod metadata;
mod resolver;

pub use config::{
    DEFAULT_REF, DEFAULT_REPOSITORY, METHODOLOGY_DIR_ENV, REQUEST_TIMEOUT, SourceConfig,
    TARBALL_URL_ENV,
};
pub use extract::extract_subtree;
pub use metadata::SourceMetadata;
pub use resolver::{MaterializedSource, SourceResolver};
