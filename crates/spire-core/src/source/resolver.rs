//! Materializing a payload directory from the configured source

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use spire_fs::SpirePath;
use tempfile::TempDir;

use super::{SourceConfig, SourceMetadata, extract};
use crate::{Error, Result};

const USER_AGENT_VALUE: &str = concat!("spire/", env!("CARGO_PKG_VERSION"));

/// A payload directory ready to be overlaid onto the local copy.
///
/// Downloaded payloads live in a scratch directory that is removed when this
/// value is dropped.
#[derive(Debug)]
pub struct MaterializedSource {
    path: PathBuf,
    scratch: Option<TempDir>,
}

impl MaterializedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory is scratch space owned by this value.
    pub fn is_temporary(&self) -> bool {
        self.scratch.is_some()
    }
}

/// Resolves [`SourceMetadata`] into a local payload directory.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    config: SourceConfig,
    scratch_parent: Option<PathBuf>,
}

impl SourceResolver {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            scratch_parent: None,
        }
    }

    /// Create scratch directories under `dir` instead of the system temp dir.
    pub fn with_scratch_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Produce the payload directory for `metadata`.
    ///
    /// A configured local directory always wins over downloading.
    pub fn resolve(&self, metadata: &SourceMetadata) -> Result<MaterializedSource> {
        match &self.config.local_dir {
            Some(dir) => Self::resolve_local(dir),
            None => self.download(metadata),
        }
    }

    fn resolve_local(dir: &Path) -> Result<MaterializedSource> {
        let meta = std::fs::metadata(dir).map_err(|e| Error::io(dir, e))?;
        if !meta.is_dir() {
            return Err(Error::SourceNotADirectory {
                path: dir.to_path_buf(),
            });
        }

        tracing::debug!("Using local methodology source {}", dir.display());
        Ok(MaterializedSource {
            path: dir.to_path_buf(),
            scratch: None,
        })
    }

    /// Download the tarball named by `metadata` and extract its payload.
    pub fn download(&self, metadata: &SourceMetadata) -> Result<MaterializedSource> {
        let url = metadata.tarball_url.as_str();
        tracing::info!("Downloading methodology from {}", url);

        let network_error = |e: reqwest::Error| Error::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(network_error)?;

        let response = client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let scratch = self.scratch_dir()?;
        extract::extract_subtree(response, scratch.path())?;

        let marker = scratch
            .path()
            .join(SpirePath::ProjectRootDir.as_str())
            .join(SpirePath::Manifest.as_str());
        if !marker.is_file() {
            return Err(Error::MissingManifest {
                path: format!("{}/{}", SpirePath::ProjectRootDir, SpirePath::Manifest),
            });
        }

        Ok(MaterializedSource {
            path: scratch.path().to_path_buf(),
            scratch: Some(scratch),
        })
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("spire-methodology-");

        match &self.scratch_parent {
            Some(parent) => builder.tempdir_in(parent).map_err(|e| Error::io(parent, e)),
            None => builder
                .tempdir()
                .map_err(|e| Error::io(std::env::temp_dir(), e)),
        }
    }
}
