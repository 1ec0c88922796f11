//! Per-directory ignore rules.
//!
//! Each directory may carry an ignore file (`.rfhubignore` by default) with
//! one regular expression per line. A directory's effective rule set is its
//! parent's set extended with the local patterns; it never replaces them.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use kwdoc_shared::{KwdocError, Result};

/// Matches comment lines (leading whitespace allowed).
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#").expect("comment regex"));

/// An ordered set of exclusion patterns matched against entry base names.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    patterns: Vec<Regex>,
}

impl IgnoreRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the base rule set from caller-supplied patterns.
    ///
    /// Unlike ignore files, an invalid base pattern is a configuration error.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    KwdocError::config(format!("invalid ignore pattern '{}': {e}", p.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Effective rule set for `dir`: these rules plus the patterns from the
    /// ignore file in `dir`, if it exists and is readable.
    pub fn extend_from_dir(&self, dir: &Path, ignore_file_name: &str) -> Self {
        let path = dir.join(ignore_file_name);
        if !path.is_file() {
            return self.clone();
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable ignore file, ignoring it");
                return self.clone();
            }
        };

        match compile_lines(&content) {
            Ok(local) => {
                debug!(path = %path.display(), patterns = local.len(), "loaded ignore file");
                let mut patterns = self.patterns.clone();
                patterns.extend(local);
                Self { patterns }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed ignore file, ignoring it");
                self.clone()
            }
        }
    }

    /// Whether `name` matches any pattern anywhere in the string.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }

    /// Pattern sources in order.
    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(Regex::as_str).collect()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Pattern lines of an ignore file: trimmed, without comments and blanks.
pub fn parse_ignore_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter(|line| !COMMENT_RE.is_match(line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn compile_lines(content: &str) -> std::result::Result<Vec<Regex>, regex::Error> {
    parse_ignore_lines(content)
        .into_iter()
        .map(Regex::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let content = "# top comment\n\n  c_dir  \n   # indented comment\n\\.bak$\n\t\n";
        assert_eq!(parse_ignore_lines(content), ["c_dir", r"\.bak$"]);
    }

    #[test]
    fn patterns_match_anywhere_in_name() {
        let rules = IgnoreRuleSet::from_patterns(&["c"]).unwrap();
        assert!(rules.is_ignored("c_dir"));
        assert!(rules.is_ignored("abc.resource"));
        assert!(!rules.is_ignored("b.resource"));
    }

    #[test]
    fn child_extends_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".rfhubignore"), "local\n").unwrap();

        let parent = IgnoreRuleSet::from_patterns(&["inherited"]).unwrap();
        let child = parent.extend_from_dir(dir.path(), ".rfhubignore");

        assert_eq!(child.patterns(), ["inherited", "local"]);
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn missing_ignore_file_keeps_inherited_set() {
        let dir = tempfile::tempdir().unwrap();
        let parent = IgnoreRuleSet::from_patterns(&["x"]).unwrap();
        let child = parent.extend_from_dir(dir.path(), ".rfhubignore");
        assert_eq!(child.patterns(), ["x"]);
    }

    #[test]
    fn malformed_ignore_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".rfhubignore"), "ok\n([unclosed\n").unwrap();

        let child = IgnoreRuleSet::new().extend_from_dir(dir.path(), ".rfhubignore");
        assert!(child.is_empty());
    }

    #[test]
    fn non_utf8_ignore_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".rfhubignore"), [0xff, 0xfe, b'a']).unwrap();

        let child = IgnoreRuleSet::new().extend_from_dir(dir.path(), ".rfhubignore");
        assert!(child.is_empty());
    }

    #[test]
    fn invalid_base_pattern_is_config_error() {
        let err = IgnoreRuleSet::from_patterns(&["(["]).unwrap_err();
        assert!(err.to_string().contains("invalid ignore pattern"));
    }
}
