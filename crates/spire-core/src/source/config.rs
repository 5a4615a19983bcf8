//! Source configuration

use std::path::PathBuf;
use std::time::Duration;

use super::SourceMetadata;

/// Repository the payload is fetched from by default.
pub const DEFAULT_REPOSITORY: &str = "niparis/spire";

/// Branch the payload is fetched from by default.
pub const DEFAULT_REF: &str = "main";

/// HTTP request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Names a local directory to use as the payload instead of downloading.
pub const METHODOLOGY_DIR_ENV: &str = "SPIRE_METHODOLOGY_DIR";

/// Replaces the computed tarball URL.
pub const TARBALL_URL_ENV: &str = "SPIRE_TARBALL_URL";

/// Where the canonical payload comes from.
///
/// Passed explicitly to the resolver and the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// `owner/name` of the hosting repository
    pub repository: String,
    /// Branch or tag
    pub reference: String,
    /// URL used instead of the computed archive URL
    pub tarball_url_override: Option<String>,
    /// Local payload directory; disables downloading
    pub local_dir: Option<PathBuf>,
    /// Fixed HTTP timeout
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: DEFAULT_REPOSITORY.to_string(),
            reference: DEFAULT_REF.to_string(),
            tarball_url_override: None,
            local_dir: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl SourceConfig {
    /// Defaults overlaid with `SPIRE_METHODOLOGY_DIR` and `SPIRE_TARBALL_URL`.
    pub fn from_env() -> Self {
        Self::default().with_env_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay environment values obtained through `lookup`. Blank values are ignored.
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(dir) = non_blank(METHODOLOGY_DIR_ENV) {
            self.local_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = non_blank(TARBALL_URL_ENV) {
            self.tarball_url_override = Some(url);
        }
        self
    }

    pub fn with_local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    pub fn with_tarball_url(mut self, url: impl Into<String>) -> Self {
        self.tarball_url_override = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Archive URL for a repository and ref.
    ///
    /// Tag refs (`v` followed by a digit) use the tag archive, anything else
    /// the branch archive.
    pub fn tarball_url_for(&self, repository: &str, reference: &str) -> String {
        if let Some(url) = &self.tarball_url_override {
            return url.clone();
        }

        let kind = if is_tag_ref(reference) { "tags" } else { "heads" };
        format!("https://github.com/{repository}/archive/refs/{kind}/{reference}.tar.gz")
    }

    /// Metadata describing the configured default source.
    pub fn default_metadata(&self) -> SourceMetadata {
        self.normalize(SourceMetadata::default())
    }

    /// Fill empty metadata fields from this configuration.
    pub fn normalize(&self, metadata: SourceMetadata) -> SourceMetadata {
        let or_default = |value: &str, default: &str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed.to_string()
            }
        };

        let repository = or_default(&metadata.repository, &self.repository);
        let reference = or_default(&metadata.reference, &self.reference);
        let tarball_url = match metadata.tarball_url.trim() {
            "" => self.tarball_url_for(&repository, &reference),
            url => url.to_string(),
        };

        SourceMetadata {
            repository,
            reference,
            tarball_url,
            fetched_at: metadata.fetched_at,
        }
    }
}

fn is_tag_ref(reference: &str) -> bool {
    let mut chars = reference.chars();
    chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
}
