//! Manifest parsing and validation.

use std::path::Path;

use rstest::rstest;
use spire_core::manifest::{RawManifest, RawRule};
use spire_core::{CopyPolicy, Error, ErrorKind, ProjectRootManifest};
use spire_test_utils::payload::STANDARD_MANIFEST;
use tempfile::TempDir;

fn parse(json: &str) -> spire_core::Result<ProjectRootManifest> {
    RawManifest::parse(json, Path::new("manifest.json"))?.validate()
}

fn single_rule(rule: &str) -> String {
    format!(r#"{{"version": 1, "mappings": [{rule}]}}"#)
}

#[test]
fn test_standard_manifest_parses() {
    let manifest = parse(STANDARD_MANIFEST).unwrap();

    assert_eq!(manifest.version, 1);
    assert_eq!(manifest.rules.len(), 4);
    let first = &manifest.rules[0];
    assert_eq!(first.source.as_str(), "local_agents.md");
    assert_eq!(first.destination.as_str(), "AGENTS.md");
    assert_eq!(first.on_init, CopyPolicy::IfMissing);
    assert_eq!(first.on_update, CopyPolicy::NeverOverwrite);
    assert!(first.notify_if_source_changed);
}

#[test]
fn test_notify_flag_defaults_to_false() {
    let json = single_rule(
        r#"{"source": "a.md", "destination": "a.md", "on_init": "if_missing", "on_update": "if_missing"}"#,
    );
    let manifest = parse(&json).unwrap();
    assert!(!manifest.rules[0].notify_if_source_changed);
}

#[rstest]
#[case::unknown_top_level(r#"{"version": 1, "mappings": [], "extra": true}"#)]
#[case::unknown_rule_field(&single_rule(
    r#"{"source": "a", "destination": "b", "on_init": "if_missing", "on_update": "if_missing", "mode": "x"}"#
))]
#[case::malformed(r#"{"version": 1, "mappings": ["#)]
#[case::wrong_type(r#"{"version": "1", "mappings": []}"#)]
fn test_structural_problems_are_schema_errors(#[case] json: &str) {
    let err = parse(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema, "{err}");
}

#[rstest]
#[case::bad_version(r#"{"version": 2, "mappings": [{"source": "a", "destination": "b", "on_init": "if_missing", "on_update": "if_missing"}]}"#, "version")]
#[case::missing_version(r#"{"mappings": [{"source": "a", "destination": "b", "on_init": "if_missing", "on_update": "if_missing"}]}"#, "version")]
#[case::no_mappings(r#"{"version": 1, "mappings": []}"#, "mappings")]
#[case::empty_source(&single_rule(r#"{"source": " ", "destination": "b", "on_init": "if_missing", "on_update": "if_missing"}"#), "mappings[0].source")]
#[case::absolute_source(&single_rule(r#"{"source": "/etc/passwd", "destination": "b", "on_init": "if_missing", "on_update": "if_missing"}"#), "mappings[0].source")]
#[case::escaping_destination(&single_rule(r#"{"source": "a", "destination": "../escape.txt", "on_init": "if_missing", "on_update": "if_missing"}"#), "mappings[0].destination")]
#[case::dot_destination(&single_rule(r#"{"source": "a", "destination": "x/..", "on_init": "if_missing", "on_update": "if_missing"}"#), "mappings[0].destination")]
#[case::bad_init_policy(&single_rule(r#"{"source": "a", "destination": "b", "on_init": "always", "on_update": "if_missing"}"#), "mappings[0].on_init")]
#[case::missing_update_policy(&single_rule(r#"{"source": "a", "destination": "b", "on_init": "if_missing"}"#), "mappings[0].on_update")]
fn test_semantic_problems_are_validation_errors(#[case] json: &str, #[case] field: &str) {
    let err = parse(json).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation, "{err}");
    assert!(
        matches!(&err, Error::ManifestValidation { field: actual, .. } if actual == field),
        "expected field {field}, got {err}"
    );
}

#[test]
fn test_validation_reports_first_bad_mapping_index() {
    let raw = RawManifest {
        version: 1,
        mappings: vec![
            RawRule {
                source: "ok.md".into(),
                destination: "ok.md".into(),
                on_init: "if_missing".into(),
                on_update: "never_overwrite".into(),
                notify_if_source_changed: false,
            },
            RawRule {
                source: "ok.md".into(),
                destination: "../escape.txt".into(),
                on_init: "if_missing".into(),
                on_update: "never_overwrite".into(),
                notify_if_source_changed: false,
            },
        ],
    };

    let err = raw.validate().unwrap_err();
    assert!(err.to_string().contains("mappings[1].destination"), "{err}");
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = ProjectRootManifest::load(&temp.path().join("manifest.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_load_reads_and_validates() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manifest.json");
    std::fs::write(&path, STANDARD_MANIFEST).unwrap();

    let manifest = ProjectRootManifest::load(&path).unwrap();
    assert_eq!(manifest.rules[2].destination.as_str(), ".opencode/agents/plan.json");
}
