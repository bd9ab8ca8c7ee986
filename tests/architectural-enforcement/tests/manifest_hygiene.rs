//! Integration Test: Manifest Hygiene
//!
//! Test tooling belongs in `[dev-dependencies]`; shipping it as a runtime
//! dependency bloats every consumer of the engine. Shared package metadata
//! lives once in the root `[workspace.package]` and members inherit it.

use std::fs;

use architectural_enforcement::{manifest_keys, manifest_section, member_manifests};

/// Crates only tests may use
const TEST_ONLY_CRATES: &[&str] = &["serde_json", "tokio-test", "pretty_assertions", "tempfile"];

/// Crates whose runtime code needs `serde_json`
const JSON_AT_RUNTIME: &[&str] = &["astro-sim"];

/// Package fields every member inherits from the workspace
const INHERITED_FIELDS: &[&str] = &["version", "edition", "authors", "license"];

#[test]
fn test_test_tooling_stays_in_dev_dependencies() {
    let mut offenders = Vec::new();

    for manifest in member_manifests() {
        let content = fs::read_to_string(&manifest).expect("member manifest readable");
        let runtime_json_allowed = manifest_section(&content, "package")
            .iter()
            .any(|line| JSON_AT_RUNTIME.iter().any(|name| *line == format!("name = \"{name}\"")));

        for key in manifest_keys(&content, "dependencies") {
            if key == "serde_json" && runtime_json_allowed {
                continue;
            }
            if TEST_ONLY_CRATES.contains(&key) {
                offenders.push(format!("{}: {key}", manifest.display()));
            }
        }
    }

    if !offenders.is_empty() {
        eprintln!("\n❌ Test-only crates listed as runtime dependencies:");
        for offender in &offenders {
            eprintln!("  ❌ {offender}");
        }
        eprintln!("\nMove them to [dev-dependencies].\n");
    }
    assert!(offenders.is_empty(), "{} offending entries", offenders.len());
}

#[test]
fn test_members_inherit_workspace_package() {
    let mut missing = Vec::new();

    for manifest in member_manifests() {
        let content = fs::read_to_string(&manifest).expect("member manifest readable");
        let package = manifest_section(&content, "package");
        for field in INHERITED_FIELDS {
            let inherited = format!("{field}.workspace = true");
            if !package.iter().any(|line| *line == inherited) {
                missing.push(format!("{}: {field}", manifest.display()));
            }
        }
    }

    assert!(
        missing.is_empty(),
        "package fields not inherited from [workspace.package]: {missing:?}"
    );
}
