//! Source resolution: local directories, downloads and safe extraction.

use std::fs;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use spire_core::source::extract_subtree;
use spire_core::{Error, ErrorKind, SourceConfig, SourceMetadata, SourceResolver};
use spire_test_utils::{MethodologyFixture, TarballBuilder, TarballServer};
use tempfile::TempDir;

fn metadata_for(url: &str) -> SourceMetadata {
    SourceMetadata {
        tarball_url: url.to_string(),
        ..SourceMetadata::default()
    }
}

fn resolver(scratch: &Path) -> SourceResolver {
    SourceResolver::new(SourceConfig::default().with_timeout(Duration::from_secs(5)))
        .with_scratch_parent(scratch)
}

fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

fn minimal_tarball() -> Vec<u8> {
    TarballBuilder::new("spire-main")
        .file("project_root/manifest.json", b"{}", 0o644)
        .build()
}

// ============================================================================
// Extraction
// ============================================================================

#[test]
fn test_extract_keeps_only_methodology_subtree() {
    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("spire-main")
        .entry("spire-main/README.md", b"readme")
        .entry("spire-main/cmd/spire/main.go", b"package main")
        .dir("skills")
        .file("skills/spec-auditor.md", b"# Spec\n", 0o644)
        .file("project_root/manifest.json", b"{}", 0o644)
        .build();

    let count = extract_subtree(tarball.as_slice(), dest.path()).unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        fs::read_to_string(dest.path().join("skills/spec-auditor.md")).unwrap(),
        "# Spec\n"
    );
    assert!(dest.path().join("project_root/manifest.json").is_file());
    assert!(!dest.path().join("README.md").exists());
    assert!(!dest.path().join("cmd").exists());
}

#[test]
fn test_extract_round_trips_fixture_tree() {
    let fixture = MethodologyFixture::standard();
    let dest = TempDir::new().unwrap();

    extract_subtree(TarballBuilder::from_dir(fixture.root()).as_slice(), dest.path()).unwrap();

    for relative in [
        "skills/spec-auditor.md",
        "agents/SPIRE.md",
        "project_root/local_agents.md",
        "project_root/.opencode/agents/verifier.json",
        "project_root/manifest.json",
    ] {
        assert_eq!(
            fs::read(dest.path().join(relative)).unwrap(),
            fs::read(fixture.path(relative)).unwrap(),
            "{relative}"
        );
    }
}

#[test]
fn test_extract_rejects_parent_traversal() {
    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("pkg-main")
        .raw_entry("pkg-main/methodology/../../escape", b"owned")
        .build();

    let err = extract_subtree(tarball.as_slice(), dest.path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert!(matches!(err, Error::ArchiveTraversal { .. }), "{err}");
    assert!(!dest.path().join("../escape").exists());
}

#[test]
fn test_extract_rejects_nested_traversal() {
    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("pkg-main")
        .raw_entry("pkg-main/methodology/skills/../../../escape", b"owned")
        .build();

    let err = extract_subtree(tarball.as_slice(), dest.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_extract_without_subtree_is_empty() {
    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("spire-main")
        .entry("spire-main/README.md", b"readme")
        .build();

    let err = extract_subtree(tarball.as_slice(), dest.path()).unwrap_err();

    assert!(matches!(err, Error::ArchiveEmpty), "{err}");
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_extract_rejects_non_gzip_input() {
    let dest = TempDir::new().unwrap();
    let err = extract_subtree(&b"definitely not a tarball"[..], dest.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn test_extract_skips_symlinks() {
    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("spire-main")
        .file("project_root/manifest.json", b"{}", 0o644)
        .symlink("skills/passwd", "/etc/passwd")
        .build();

    extract_subtree(tarball.as_slice(), dest.path()).unwrap();

    assert!(fs::symlink_metadata(dest.path().join("skills/passwd")).is_err());
}

#[test]
#[cfg(unix)]
fn test_extract_preserves_file_modes() {
    use std::os::unix::fs::PermissionsExt;

    let dest = TempDir::new().unwrap();
    let tarball = TarballBuilder::new("spire-main")
        .file("bin/check.sh", b"#!/bin/sh\n", 0o755)
        .file("docs/readme.md", b"docs", 0o644)
        .build();

    extract_subtree(tarball.as_slice(), dest.path()).unwrap();

    let mode = |p: &str| {
        fs::metadata(dest.path().join(p))
            .unwrap()
            .permissions()
            .mode()
            & 0o777
    };
    assert_eq!(mode("bin/check.sh"), 0o755);
    assert_eq!(mode("docs/readme.md"), 0o644);
}

// ============================================================================
// Local sources
// ============================================================================

#[test]
fn test_local_directory_is_used_in_place() {
    let fixture = MethodologyFixture::standard();
    let resolver = SourceResolver::new(SourceConfig::default().with_local_dir(fixture.root()));

    let source = resolver.resolve(&metadata_for("http://127.0.0.1:1/unused")).unwrap();

    assert_eq!(source.path(), fixture.root());
    assert!(!source.is_temporary());
}

#[test]
fn test_missing_local_directory_is_io_error() {
    let scratch = TempDir::new().unwrap();
    let resolver =
        SourceResolver::new(SourceConfig::default().with_local_dir(scratch.path().join("nope")));

    let err = resolver.resolve(&SourceMetadata::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_local_file_is_not_a_source_directory() {
    let scratch = TempDir::new().unwrap();
    let file = scratch.path().join("payload.txt");
    fs::write(&file, "x").unwrap();
    let resolver = SourceResolver::new(SourceConfig::default().with_local_dir(&file));

    let err = resolver.resolve(&SourceMetadata::default()).unwrap_err();
    assert!(matches!(err, Error::SourceNotADirectory { .. }), "{err}");
}

// ============================================================================
// Downloads
// ============================================================================

#[test]
fn test_download_extracts_into_scratch_and_cleans_up() {
    let fixture = MethodologyFixture::standard();
    let tarball = TarballBuilder::from_dir(fixture.root());
    let server = TarballServer::serve(move || tarball.clone());
    let scratch = TempDir::new().unwrap();

    let source = resolver(scratch.path())
        .resolve(&metadata_for(&server.url()))
        .unwrap();

    assert!(source.is_temporary());
    assert!(source.path().starts_with(scratch.path()));
    assert_eq!(
        fs::read_to_string(source.path().join("skills/spec-auditor.md")).unwrap(),
        "# Spec\n"
    );
    assert_eq!(server.request_count(), 1);

    drop(source);
    assert_eq!(entry_count(scratch.path()), 0);
}

#[test]
fn test_download_uses_metadata_url_over_config() {
    let server = TarballServer::serve(minimal_tarball);
    let scratch = TempDir::new().unwrap();
    let resolver = SourceResolver::new(
        SourceConfig::default().with_tarball_url("http://127.0.0.1:1/never.tar.gz"),
    )
    .with_scratch_parent(scratch.path());

    resolver.resolve(&metadata_for(&server.url())).unwrap();
    assert_eq!(server.request_count(), 1);
}

#[test]
fn test_download_traversal_aborts_and_removes_scratch() {
    let server = TarballServer::serve(|| {
        TarballBuilder::new("pkg-main")
            .file("project_root/manifest.json", b"{}", 0o644)
            .raw_entry("pkg-main/methodology/../../escape", b"owned")
            .build()
    });
    let scratch = TempDir::new().unwrap();

    let err = resolver(scratch.path())
        .resolve(&metadata_for(&server.url()))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(entry_count(scratch.path()), 0);
}

#[test]
fn test_download_without_manifest_is_integrity_error() {
    let server = TarballServer::serve(|| {
        TarballBuilder::new("spire-main")
            .file("skills/spec-auditor.md", b"# Spec\n", 0o644)
            .build()
    });
    let scratch = TempDir::new().unwrap();

    let err = resolver(scratch.path())
        .resolve(&metadata_for(&server.url()))
        .unwrap_err();

    assert!(matches!(err, Error::MissingManifest { .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(entry_count(scratch.path()), 0);
}

#[test]
fn test_http_error_status_is_network_error() {
    let server = TarballServer::serve(minimal_tarball);
    let scratch = TempDir::new().unwrap();

    let err = resolver(scratch.path())
        .resolve(&metadata_for(&server.missing_url()))
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }), "{err}");
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(entry_count(scratch.path()), 0);
}

#[test]
fn test_connection_refused_is_network_error() {
    let scratch = TempDir::new().unwrap();

    let err = resolver(scratch.path())
        .resolve(&metadata_for("http://127.0.0.1:1/spire.tar.gz"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
}
