//! JSON document loading and saving

use crate::{Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

/// Store for small JSON bookkeeping documents.
///
/// Absent documents are reported as `None` rather than as an error, and
/// saves go through [`io::write_atomic`] so readers never observe a
/// half-written file.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStore;

impl JsonStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document, or `None` if the file does not exist.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        let native = path.to_native();
        let content = match std::fs::read_to_string(&native) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(native, e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Parse {
                path: native,
                message: e.to_string(),
            })
    }

    /// Serialize a document as pretty JSON and replace the file atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(|e| Error::Serialize {
            path: path.to_native(),
            message: e.to_string(),
        })?;

        io::write_atomic(path, content.as_bytes())
    }
}
