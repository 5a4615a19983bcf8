//! Normalized path handling for cross-platform compatibility

use std::path::{Component, Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Provides consistent path handling across platforms by normalizing
/// all paths to forward slashes internally and converting to
/// platform-native format only at I/O boundaries.
///
/// Construction resolves `.` and `..` segments lexically. Leading `..`
/// segments of a relative path are kept (`../proj` stays `../proj`); above
/// the root of an absolute path they are dropped. Use
/// [`validate_relative_path`] when untrusted input must be *rejected*.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self {
            inner: clean(&raw),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// Dot segments in the result are resolved, so joining `../x` onto a root
    /// yields a path that fails a subsequent [`NormalizedPath::starts_with`]
    /// check against that root.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Whether this path is `prefix` itself or lies underneath it.
    ///
    /// Compares whole segments: `a/bc` does not start with `a/b`.
    /// The relative root `.` contains every relative path that does not
    /// climb out of it.
    pub fn starts_with(&self, prefix: &NormalizedPath) -> bool {
        let prefix = prefix.inner.trim_end_matches('/');
        if prefix.is_empty() {
            return self.inner.starts_with('/');
        }
        if prefix == "." {
            return !self.is_absolute() && !self.climbs_out();
        }
        self.inner == prefix
            || self
                .inner
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Path of `self` relative to `base`, if `self` lies under `base`.
    pub fn strip_prefix(&self, base: &NormalizedPath) -> Option<Self> {
        if !self.starts_with(base) {
            return None;
        }
        if base.inner == "." {
            return Some(self.clone());
        }
        let base = base.inner.trim_end_matches('/');
        let rest = self.inner[base.len()..].trim_start_matches('/');
        Some(Self {
            inner: if rest.is_empty() { ".".to_string() } else { rest.to_string() },
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    fn climbs_out(&self) -> bool {
        self.inner == ".." || self.inner.starts_with("../")
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

fn clean(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") | None if !absolute => segments.push(".."),
                Some(_) => {
                    segments.pop();
                }
                // Nothing above `/`
                None => {}
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (absolute, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

/// Why a relative path from untrusted input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path cannot be empty")]
    Empty,

    #[error("path must be relative: {0:?}")]
    Absolute(String),

    #[error("path cannot resolve to current directory: {0:?}")]
    CurrentDir(String),

    #[error("path traversal is not allowed: {0:?}")]
    Traversal(String),
}

/// Validate a relative path taken from a manifest or archive.
///
/// The path must be non-empty, relative, must not resolve to its own root and
/// must never climb above it through `..` segments. On success the path is
/// returned in normalized form.
pub fn validate_relative_path(value: &str) -> std::result::Result<NormalizedPath, PathError> {
    if value.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let slashed = value.replace('\\', "/");
    let has_prefix = Path::new(value)
        .components()
        .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
    if slashed.starts_with('/') || has_prefix {
        return Err(PathError::Absolute(value.to_string()));
    }

    let mut depth: usize = 0;
    for segment in slashed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| PathError::Traversal(value.to_string()))?;
            }
            _ => depth += 1,
        }
    }

    if depth == 0 {
        return Err(PathError::CurrentDir(value.to_string()));
    }

    Ok(NormalizedPath::new(&slashed))
}

/// Lexical containment check between two native paths.
///
/// Both paths are normalized first, so `root/a/../../x` is correctly reported
/// as outside `root`. Symlinks are not resolved.
pub fn is_within(root: &Path, target: &Path) -> bool {
    NormalizedPath::new(target).starts_with(&NormalizedPath::new(root))
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
