//! SHA-256 digest utilities
//!
//! Digests are plain lowercase hex, the format stored in the sync state file.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Compute the SHA-256 digest of a byte slice.
pub fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of a file's contents.
///
/// The whole file is read into memory first.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_digest(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_digest(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(compute_digest(b"test"), compute_digest(b"test"));
    }

    #[test]
    fn different_content_different_digest() {
        assert_ne!(compute_digest(b"aaa"), compute_digest(b"bbb"));
    }

    #[test]
    fn digest_known_value() {
        assert_eq!(
            compute_digest(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn file_digest_matches_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "hello world").unwrap();

        assert_eq!(
            compute_file_digest(&path).unwrap(),
            compute_digest(b"hello world")
        );
    }
}
