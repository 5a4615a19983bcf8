//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let result = fill_and_rename(temp_file, &temp_path, &native_path, content);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn fill_and_rename(
    mut temp_file: fs::File,
    temp_path: &Path,
    native_path: &Path,
    content: &[u8],
) -> Result<()> {
    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.to_path_buf(),
    })?;
    drop(temp_file);

    fs::rename(temp_path, native_path).map_err(|e| Error::io(native_path, e))
}

/// Read a whole file into memory.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Copy a single file, creating parent directories as needed.
///
/// The destination is replaced atomically and receives the source's
/// permissions.
pub fn copy_file(source: &Path, destination: &NormalizedPath) -> Result<()> {
    let content = read_bytes(source)?;
    let permissions = fs::metadata(source)
        .map_err(|e| Error::io(source, e))?
        .permissions();

    write_atomic(destination, &content)?;

    let native = destination.to_native();
    fs::set_permissions(&native, permissions).map_err(|e| Error::io(&native, e))?;
    Ok(())
}

/// One step of a directory-tree copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyStep {
    /// Ensure a directory exists at the destination
    CreateDir(PathBuf),
    /// Copy a regular file
    CopyFile { from: PathBuf, to: PathBuf },
}

/// Plan a copy of the tree at `source` onto `destination`.
///
/// The walk is iterative and sorted by file name, so the plan is
/// deterministic. Symlinks and other special files are left out.
pub fn plan_tree_copy(source: &Path, destination: &Path) -> Result<Vec<CopyStep>> {
    let mut steps = Vec::new();

    for entry in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;

        let relative = entry.path().strip_prefix(source).map_err(|_| {
            Error::io(
                entry.path(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "walked entry outside of source tree",
                ),
            )
        })?;
        let target = if relative.as_os_str().is_empty() {
            destination.to_path_buf()
        } else {
            destination.join(relative)
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            steps.push(CopyStep::CreateDir(target));
        } else if file_type.is_file() {
            steps.push(CopyStep::CopyFile {
                from: entry.path().to_path_buf(),
                to: target,
            });
        } else {
            tracing::warn!("Skipping non-regular file {}", entry.path().display());
        }
    }

    Ok(steps)
}

/// Copy the tree at `source` onto `destination`, overwriting files that
/// exist in both. Files present only at the destination are left alone.
///
/// Returns the number of files copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    let steps = plan_tree_copy(source, destination)?;
    let mut copied = 0;

    for step in steps {
        match step {
            CopyStep::CreateDir(dir) => {
                fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            }
            CopyStep::CopyFile { from, to } => {
                copy_file(&from, &NormalizedPath::new(&to))?;
                copied += 1;
            }
        }
    }

    tracing::debug!(
        "Copied {} files from {} to {}",
        copied,
        source.display(),
        destination.display()
    );
    Ok(copied)
}
