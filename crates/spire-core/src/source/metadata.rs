//! Persisted record of where the local payload came from

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use spire_fs::{JsonStore, NormalizedPath, SpirePath};

use crate::Result;

/// Source of the local payload copy, stored as `.spire-source.json`.
///
/// Empty fields are filled from the active [`SourceConfig`](super::SourceConfig)
/// when the metadata is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    #[serde(default)]
    pub repository: String,
    #[serde(default, rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub tarball_url: String,
    /// RFC 3339 UTC timestamp of the last fetch
    #[serde(default)]
    pub fetched_at: String,
}

impl SourceMetadata {
    fn path(dir: &Path) -> NormalizedPath {
        NormalizedPath::new(dir.join(SpirePath::SourceMetadata.as_str()))
    }

    /// Load the metadata stored in `dir`, or `None` if there is none.
    pub fn read(dir: &Path) -> Result<Option<Self>> {
        Ok(JsonStore::new().load(&Self::path(dir))?)
    }

    pub fn write(&self, dir: &Path) -> Result<()> {
        JsonStore::new().save(&Self::path(dir), self)?;
        Ok(())
    }

    /// Record the current time as the fetch time.
    pub fn stamped_now(mut self) -> Self {
        self.fetched_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_ref_field_name() {
        let meta = SourceMetadata {
            repository: "niparis/spire".into(),
            reference: "main".into(),
            tarball_url: "u".into(),
            fetched_at: String::new(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["ref"], "main");
    }

    #[test]
    fn stamp_is_utc_rfc3339() {
        let meta = SourceMetadata::default().stamped_now();
        assert!(meta.fetched_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.fetched_at).is_ok());
    }
}
