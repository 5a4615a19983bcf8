//! Project-root manifest parsing and validation
//!
//! The manifest (`project_root/manifest.json` inside the payload) maps
//! payload files to destinations in the project root. Parsing is strict:
//! unknown fields are rejected. Validation is a separate step that turns the
//! raw document into a typed [`ProjectRootManifest`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spire_fs::{NormalizedPath, validate_relative_path};

use crate::{Error, Result};

/// The only supported manifest schema version.
pub const MANIFEST_VERSION: i64 = 1;

/// When a destination may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyPolicy {
    /// Write only if the destination is absent
    IfMissing,
    /// Write only if absent, except for changed managed destinations
    NeverOverwrite,
}

impl CopyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IfMissing => "if_missing",
            Self::NeverOverwrite => "never_overwrite",
        }
    }
}

impl FromStr for CopyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "if_missing" => Ok(Self::IfMissing),
            "never_overwrite" => Ok(Self::NeverOverwrite),
            other => Err(format!("unknown policy {other:?}")),
        }
    }
}

impl fmt::Display for CopyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest exactly as written, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawManifest {
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub mappings: Vec<RawRule>,
}

/// A mapping exactly as written, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub on_init: String,
    #[serde(default)]
    pub on_update: String,
    #[serde(default)]
    pub notify_if_source_changed: bool,
}

/// One validated mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Relative to the payload's `project_root/` directory
    pub source: NormalizedPath,
    /// Relative to the project root
    pub destination: NormalizedPath,
    pub on_init: CopyPolicy,
    pub on_update: CopyPolicy,
    pub notify_if_source_changed: bool,
}

/// A validated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRootManifest {
    pub version: i64,
    pub rules: Vec<Rule>,
}

impl RawManifest {
    /// Parse manifest JSON. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ManifestSchema {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check every field and build the typed manifest.
    pub fn validate(&self) -> Result<ProjectRootManifest> {
        check_header(self.version, self.mappings.len())?;

        let rules = self
            .mappings
            .iter()
            .enumerate()
            .map(|(i, raw)| -> Result<Rule> {
                let field = |name: &str| format!("mappings[{i}].{name}");
                Ok(Rule {
                    source: check_path(&raw.source, || field("source"))?,
                    destination: check_path(&raw.destination, || field("destination"))?,
                    on_init: check_policy(&raw.on_init, || field("on_init"))?,
                    on_update: check_policy(&raw.on_update, || field("on_update"))?,
                    notify_if_source_changed: raw.notify_if_source_changed,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProjectRootManifest {
            version: self.version,
            rules,
        })
    }
}

impl ProjectRootManifest {
    /// Read, parse and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let manifest = RawManifest::parse(&content, path)?.validate()?;
        tracing::debug!(
            "Loaded manifest {} with {} rules",
            path.display(),
            manifest.rules.len()
        );
        Ok(manifest)
    }

    /// Re-check a manifest that may have been built by hand.
    pub fn validate(&self) -> Result<()> {
        check_header(self.version, self.rules.len())?;
        for (i, rule) in self.rules.iter().enumerate() {
            check_path(rule.source.as_str(), || format!("mappings[{i}].source"))?;
            check_path(rule.destination.as_str(), || {
                format!("mappings[{i}].destination")
            })?;
        }
        Ok(())
    }
}

fn check_header(version: i64, rule_count: usize) -> Result<()> {
    if version != MANIFEST_VERSION {
        return Err(Error::ManifestValidation {
            field: "version".into(),
            message: format!("unsupported version {version}"),
        });
    }
    if rule_count == 0 {
        return Err(Error::ManifestValidation {
            field: "mappings".into(),
            message: "must contain at least one mapping".into(),
        });
    }
    Ok(())
}

fn check_path(value: &str, field: impl Fn() -> String) -> Result<NormalizedPath> {
    validate_relative_path(value).map_err(|e| Error::ManifestValidation {
        field: field(),
        message: e.to_string(),
    })
}

fn check_policy(value: &str, field: impl Fn() -> String) -> Result<CopyPolicy> {
    value.parse().map_err(|message| Error::ManifestValidation {
        field: field(),
        message,
    })
}
