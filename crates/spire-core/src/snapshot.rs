//! Content-addressed snapshots of a payload tree

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use spire_fs::{NormalizedPath, SpirePath, checksum};
use walkdir::WalkDir;

use crate::{Error, Result};

/// Map from root-relative file path to the hex SHA-256 digest of its bytes.
///
/// Paths use forward slashes. The sync-state and source-metadata files at
/// the snapshot root are never included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadSnapshot {
    digests: BTreeMap<String, String>,
}

impl PayloadSnapshot {
    /// Hash every regular file under `root`.
    ///
    /// # Errors
    ///
    /// Fails if the tree cannot be walked or any file cannot be read; no
    /// partial snapshot is returned.
    pub fn capture(root: &Path) -> Result<Self> {
        let mut digests = BTreeMap::new();

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::io(path, e.into())
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => NormalizedPath::new(relative).as_str().to_string(),
                Err(_) => continue,
            };
            if SpirePath::is_bookkeeping(&relative) {
                continue;
            }

            let digest = checksum::compute_file_digest(entry.path())
                .map_err(|e| Error::io(entry.path(), e))?;
            digests.insert(relative, digest);
        }

        tracing::debug!("Snapshot of {} holds {} files", root.display(), digests.len());
        Ok(Self { digests })
    }

    pub fn from_digests(digests: BTreeMap<String, String>) -> Self {
        Self { digests }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.digests.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.digests.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.digests.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Paths that differ between two snapshots.
    ///
    /// A path is reported if it was added, removed, or its digest changed.
    /// The result is sorted and each path appears once.
    pub fn changed_paths(before: &PayloadSnapshot, after: &PayloadSnapshot) -> Vec<String> {
        let mut changed: Vec<String> = after
            .iter()
            .filter(|(path, digest)| before.get(path) != Some(*digest))
            .map(|(path, _)| path.to_string())
            .chain(
                before
                    .iter()
                    .filter(|(path, _)| !after.contains(path))
                    .map(|(path, _)| path.to_string()),
            )
            .collect();

        changed.sort();
        changed.dedup();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> PayloadSnapshot {
        PayloadSnapshot::from_digests(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn changed_paths_covers_added_removed_modified() {
        let before = snapshot(&[("a.md", "1"), ("b.md", "2"), ("c.md", "3")]);
        let after = snapshot(&[("a.md", "1"), ("b.md", "20"), ("d.md", "4")]);

        assert_eq!(
            PayloadSnapshot::changed_paths(&before, &after),
            vec!["b.md", "c.md", "d.md"]
        );
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let both = snapshot(&[("a.md", "1")]);
        assert!(PayloadSnapshot::changed_paths(&both, &both).is_empty());
    }

    #[test]
    fn serializes_as_plain_map() {
        let snap = snapshot(&[("docs/a.md", "abc")]);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"docs/a.md":"abc"}"#);
    }
}
