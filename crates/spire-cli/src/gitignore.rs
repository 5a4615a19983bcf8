//! `.gitignore` maintenance

use std::io::ErrorKind;
use std::path::Path;

use spire_fs::{Error, NormalizedPath, Result, io};

/// Append `entry` to `<root>/.gitignore` unless a line already matches it.
///
/// Lines are compared after trimming surrounding whitespace. The file is
/// created if absent. Returns whether the entry was added.
pub fn ensure_entry(root: &Path, entry: &str) -> Result<bool> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Ok(false);
    }

    let path = root.join(".gitignore");
    let mut content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::io(&path, e)),
    };

    if content.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');

    io::write_atomic(&NormalizedPath::new(&path), content.as_bytes())?;
    tracing::debug!("Added {} to {}", entry, path.display());
    Ok(true)
}
