//! Filesystem layer for Spire
//!
//! Provides normalized path handling, safe relative-path validation,
//! content digests and atomic I/O used by the sync engine.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use constants::SpirePath;
pub use error::{Error, Result};
pub use io::CopyStep;
pub use path::{NormalizedPath, PathError, is_within, validate_relative_path};
pub use store::JsonStore;
