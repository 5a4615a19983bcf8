//! [`MethodologyFixture`] builder for canonical payload trees.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest shipped by [`MethodologyFixture::standard`].
///
/// Root files are never overwritten on update; the `.opencode/` agents are
/// under the managed prefix and follow upstream changes.
pub const STANDARD_MANIFEST: &str = r#"{
  "version": 1,
  "mappings": [
    {
      "source": "local_agents.md",
      "destination": "AGENTS.md",
      "on_init": "if_missing",
      "on_update": "never_overwrite",
      "notify_if_source_changed": true
    },
    {
      "source": "opencode.json",
      "destination": "opencode.json",
      "on_init": "if_missing",
      "on_update": "never_overwrite",
      "notify_if_source_changed": true
    },
    {
      "source": ".opencode/agents/plan.json",
      "destination": ".opencode/agents/plan.json",
      "on_init": "if_missing",
      "on_update": "never_overwrite",
      "notify_if_source_changed": true
    },
    {
      "source": ".opencode/agents/verifier.json",
      "destination": ".opencode/agents/verifier.json",
      "on_init": "if_missing",
      "on_update": "never_overwrite",
      "notify_if_source_changed": true
    }
  ]
}
"#;

/// A canonical methodology payload in a temporary directory.
///
/// # Example
///
/// ```rust,no_run
/// use spire_test_utils::MethodologyFixture;
///
/// let source = MethodologyFixture::standard();
/// source.write("skills/spec-auditor.md", "# Spec v2\n");
/// assert!(source.root().join("project_root/manifest.json").exists());
/// ```
pub struct MethodologyFixture {
    temp_dir: TempDir,
}

impl MethodologyFixture {
    /// An empty payload directory.
    pub fn empty() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A payload with skills, agents, root templates and [`STANDARD_MANIFEST`].
    pub fn standard() -> Self {
        let fixture = Self::empty();
        fixture.write("skills/spec-auditor.md", "# Spec\n");
        fixture.write("agents/SPIRE.md", "# SPIRE\n");
        fixture.write("project_root/local_agents.md", "# Project\n");
        fixture.write(
            "project_root/opencode.json",
            "{\n  \"instructions\": [\n    \".methodology/agents/SPIRE.md\",\n    \"AGENTS.md\"\n  ]\n}\n",
        );
        fixture.write(
            "project_root/.opencode/agents/plan.json",
            "{\n  \"instructions\": [\n    \".methodology/agents/FEATURE_PLANNER.md\",\n    \"AGENTS.md\"\n  ]\n}\n",
        );
        fixture.write(
            "project_root/.opencode/agents/verifier.json",
            "{\n  \"mode\": \"subagent\",\n  \"instructions\": [\n    \".methodology/agents/VERIFICATION.md\"\n  ]\n}\n",
        );
        fixture.write("project_root/manifest.json", STANDARD_MANIFEST);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("MethodologyFixture::write {}: {e}", path.display()));
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path(relative)).unwrap();
    }
}
