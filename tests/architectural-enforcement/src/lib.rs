//! Architectural Enforcement
//!
//! Source-scanning helpers used by this package's integration tests to keep
//! engine code honest:
//! - No thread-blocking waits (the engine runs on cooperative tokio tasks)
//! - No `unwrap()`/`expect()` outside tests
//! - Member manifests keep test tooling out of runtime dependencies
//!
//! Scanning is line based. Comments are stripped, and everything from a
//! file's `#[cfg(test)]` marker onward is treated as test code.

use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern family
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Short rule name used in reports
    pub name: &'static str,
    /// Substrings that violate the rule
    pub patterns: &'static [&'static str],
}

/// One offending line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Rule that matched
    pub rule: &'static str,
    /// Trimmed source line
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} [{}] {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Workspace root, derived from this package's manifest location
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../..")))
}

/// Source directories holding production engine code
#[must_use]
pub fn production_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    vec![root.join("astro/core/src"), root.join("astro/sim/src")]
}

/// Non-test code lines of a file, comments stripped, numbered from 1
pub fn production_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
}

/// Check one file's contents against `rules`
#[must_use]
pub fn check_source(path: &Path, content: &str, rules: &[Rule]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (line, code) in production_lines(content) {
        for rule in rules {
            if rule.patterns.iter().any(|p| code.contains(p)) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line,
                    rule: rule.name,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Walk `dirs` and check every `.rs` file
#[must_use]
pub fn scan(dirs: &[PathBuf], rules: &[Rule]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for dir in dirs.iter().filter(|d| d.exists()) {
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        {
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            violations.extend(check_source(entry.path(), &content, rules));
        }
    }
    violations
}

/// Count `.rs` files under `dirs`
#[must_use]
pub fn count_sources(dirs: &[PathBuf]) -> usize {
    dirs.iter()
        .filter(|d| d.exists())
        .flat_map(|d| walkdir::WalkDir::new(d).into_iter().filter_map(Result::ok))
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .count()
}

/// Manifests of the workspace member crates
#[must_use]
pub fn member_manifests() -> Vec<PathBuf> {
    let root = workspace_root();
    ["astro/core", "astro/sim", "tests/architectural-enforcement"]
        .iter()
        .map(|member| root.join(member).join("Cargo.toml"))
        .collect()
}

/// Key lines (`key = ...`) of one `[section]` of a Cargo manifest
#[must_use]
pub fn manifest_section<'a>(content: &'a str, section: &str) -> Vec<&'a str> {
    let header = format!("[{section}]");
    content
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != header)
        .skip(1)
        .take_while(|line| !line.starts_with('['))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Key names of one `[section]` of a Cargo manifest
#[must_use]
pub fn manifest_keys<'a>(content: &'a str, section: &str) -> Vec<&'a str> {
    manifest_section(content, section)
        .into_iter()
        .filter_map(|line| line.split('=').next())
        .map(str::trim)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLEEP: Rule = Rule {
        name: "thread-sleep",
        patterns: &["thread::sleep"],
    };

    #[test]
    fn test_flags_production_lines_only() {
        let source = "\
fn tick() {
    std::thread::sleep(d); // bad
    // std::thread::sleep(d) in a comment
}

#[cfg(test)]
mod tests {
    fn helper() { std::thread::sleep(d); }
}
";
        let violations = check_source(Path::new("x.rs"), source, &[SLEEP]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
        assert_eq!(violations[0].text, "std::thread::sleep(d);");
    }

    #[test]
    fn test_workspace_root_holds_engine() {
        assert!(workspace_root().join("astro/core/src/lib.rs").exists());
    }

    #[test]
    fn test_manifest_section_keys() {
        let manifest = "\
[package]
name = \"demo\"
version.workspace = true

[dependencies]
# Logging
tracing = \"0.1\"
serde = { version = \"1.0\", features = [\"derive\"] }

[dev-dependencies]
tempfile = \"3.10\"
";
        assert_eq!(manifest_keys(manifest, "dependencies"), vec!["tracing", "serde"]);
        assert_eq!(manifest_keys(manifest, "dev-dependencies"), vec!["tempfile"]);
        assert_eq!(
            manifest_section(manifest, "package"),
            vec!["name = \"demo\"", "version.workspace = true"]
        );
        assert!(manifest_keys(manifest, "features").is_empty());
    }
}
