//! `.mrvcignore` — user-configurable ignore rules.
//!
//! A simplified pattern format, evaluated against the slash-normalized path
//! relative to the repository root:
//! - Blank lines and lines starting with `#` are skipped
//! - `*suffix` matches paths ending with `suffix`
//! - `prefix*` matches paths starting with `prefix`
//! - `dir/` matches everything under that directory
//! - Anything else must equal the path exactly
//!
//! Patterns are independent; any single match ignores the path.

use std::fs;
use std::path::Path;

/// The ignore file name at the repository root.
pub const IGNORE_FILE: &str = ".mrvcignore";

/// A parsed set of ignore patterns.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
}

impl IgnorePatterns {
    /// Load patterns from `.mrvcignore` at the repo root. A missing or
    /// unreadable file yields the empty set.
    pub fn load(repo_root: &Path) -> Self {
        match fs::read_to_string(repo_root.join(IGNORE_FILE)) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse ignore file content into patterns.
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect();
        IgnorePatterns { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Test a root-relative slash path against every pattern.
    pub fn is_ignored(&self, rel_path: &str) -> bool {
        self.patterns.iter().any(|p| pattern_matches(p, rel_path))
    }
}

fn pattern_matches(pattern: &str, rel_path: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        if rel_path.ends_with(suffix) {
            return true;
        }
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        if rel_path.starts_with(prefix) {
            return true;
        }
    }
    if pattern.ends_with('/') && rel_path.starts_with(pattern) {
        return true;
    }
    pattern == rel_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let rules = IgnorePatterns::parse("# comment\n\n  \n*.log\n");
        assert!(rules.is_ignored("app.log"));
        assert!(!rules.is_ignored("# comment"));
    }

    #[test]
    fn test_suffix_pattern() {
        let rules = IgnorePatterns::parse("*.log\n");
        assert!(rules.is_ignored("app.log"));
        assert!(rules.is_ignored("logs/deep/app.log"));
        assert!(!rules.is_ignored("app.log.txt"));
    }

    #[test]
    fn test_prefix_pattern() {
        let rules = IgnorePatterns::parse("build*\n");
        assert!(rules.is_ignored("build"));
        assert!(rules.is_ignored("build-output/file.o"));
        assert!(!rules.is_ignored("src/build"));
    }

    #[test]
    fn test_directory_pattern() {
        let rules = IgnorePatterns::parse("target/\n");
        assert!(rules.is_ignored("target/debug/app"));
        assert!(!rules.is_ignored("target"));
        assert!(!rules.is_ignored("src/target-file"));
    }

    #[test]
    fn test_exact_pattern() {
        let rules = IgnorePatterns::parse("notes.txt\n");
        assert!(rules.is_ignored("notes.txt"));
        assert!(!rules.is_ignored("sub/notes.txt"));
    }

    #[test]
    fn test_patterns_trimmed() {
        let rules = IgnorePatterns::parse("  *.tmp  \n");
        assert!(rules.is_ignored("scratch.tmp"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rules = IgnorePatterns::load(dir.path());
        assert!(rules.is_empty());
        assert!(!rules.is_ignored("anything"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(IGNORE_FILE), "*.log\n").unwrap();
        let rules = IgnorePatterns::load(dir.path());
        assert!(rules.is_ignored("app.log"));
    }
}
