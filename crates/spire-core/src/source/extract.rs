//! Safe extraction of the methodology subtree from a gzipped tarball

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use spire_fs::{SpirePath, is_within};
use tar::{Archive, EntryType};

use crate::{Error, Result};

/// Extract the `methodology/` subtree of a `.tar.gz` stream into `destination`.
///
/// The archive's single top-level directory is stripped; only entries below
/// `<top>/methodology/` are materialized, relative to `destination`. Any entry
/// whose remainder contains `..`, a root or a prefix component, or whose
/// target would land outside `destination`, aborts the extraction. Entries
/// already written are not removed here; callers extract into a scratch
/// directory they discard on error.
///
/// Only directories and regular files are created. Returns the number of
/// entries materialized.
pub fn extract_subtree<R: Read>(reader: R, destination: &Path) -> Result<usize> {
    let root = dunce::canonicalize(destination).map_err(|e| Error::io(destination, e))?;

    let mut archive = Archive::new(GzDecoder::new(reader));
    let entries = archive.entries().map_err(read_error)?;
    let mut extracted = 0;

    for entry in entries {
        let mut entry = entry.map_err(read_error)?;
        let raw_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();

        let Some(relative) = subtree_relative(&raw_name) else {
            continue;
        };
        let target = checked_target(&root, &relative)?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                extracted += 1;
            }
            EntryType::Regular | EntryType::Continuous => {
                let parent = target.parent().unwrap_or(&root);
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                ensure_resolved_within(&root, parent, &relative)?;

                let mode = entry
                    .header()
                    .mode()
                    .ok()
                    .map(|m| m & 0o777)
                    .filter(|m| *m != 0)
                    .unwrap_or(0o644);

                let mut file = File::create(&target).map_err(|e| Error::io(&target, e))?;
                io::copy(&mut entry, &mut file).map_err(read_error)?;
                set_mode(&target, mode)?;
                extracted += 1;
            }
            other => {
                tracing::warn!("Skipping unsupported archive entry {} ({:?})", raw_name, other);
            }
        }
    }

    if extracted == 0 {
        return Err(Error::ArchiveEmpty);
    }

    tracing::debug!("Extracted {} methodology entries", extracted);
    Ok(extracted)
}

/// Remainder of an entry name below `<top>/methodology/`, if it lies there.
fn subtree_relative(raw_name: &str) -> Option<String> {
    let name = raw_name.replace('\\', "/");
    let name = name.strip_prefix("./").unwrap_or(&name);

    let mut parts = name.splitn(3, '/');
    let _top = parts.next()?;
    if parts.next()? != SpirePath::ArchiveSubtree.as_str() {
        return None;
    }

    let rest = parts.next()?.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn checked_target(root: &Path, relative: &str) -> Result<PathBuf> {
    let unsafe_component = relative.starts_with('/')
        || Path::new(relative).components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if unsafe_component {
        return Err(Error::ArchiveTraversal {
            entry: relative.to_string(),
        });
    }

    let target = root.join(relative);
    if !is_within(root, &target) {
        return Err(Error::ArchiveTraversal {
            entry: relative.to_string(),
        });
    }
    Ok(target)
}

fn ensure_resolved_within(root: &Path, dir: &Path, relative: &str) -> Result<()> {
    let resolved = dunce::canonicalize(dir).map_err(|e| Error::io(dir, e))?;
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(Error::ArchiveTraversal {
            entry: relative.to_string(),
        })
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

fn read_error(e: io::Error) -> Error {
    Error::ArchiveRead {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_relative_strips_top_and_subtree() {
        assert_eq!(
            subtree_relative("spire-main/methodology/project_root/manifest.json").as_deref(),
            Some("project_root/manifest.json")
        );
        assert_eq!(
            subtree_relative("./spire-main/methodology/a.md").as_deref(),
            Some("a.md")
        );
    }

    #[test]
    fn subtree_relative_ignores_other_entries() {
        assert_eq!(subtree_relative("spire-main/README.md"), None);
        assert_eq!(subtree_relative("spire-main/methodology"), None);
        assert_eq!(subtree_relative("spire-main/methodology/"), None);
        assert_eq!(subtree_relative("spire-main/src/methodology/a.md"), None);
    }

    #[test]
    fn checked_target_rejects_traversal() {
        let root = Path::new("/scratch");
        assert!(matches!(
            checked_target(root, "../../escape"),
            Err(Error::ArchiveTraversal { .. })
        ));
        assert!(matches!(
            checked_target(root, "/etc/passwd"),
            Err(Error::ArchiveTraversal { .. })
        ));
        assert_eq!(
            checked_target(root, "docs/a.md").unwrap(),
            PathBuf::from("/scratch/docs/a.md")
        );
    }
}
