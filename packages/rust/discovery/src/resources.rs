//! Resource file discovery.
//!
//! Walks the input tree with an explicit stack of `(directory, rules)` pairs so
//! that each directory's ignore rules flow to its children without recursion.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use kwdoc_shared::{DiscoveryConfig, DiscoveryUnit};

use crate::ignore::IgnoreRuleSet;

/// Settings for a resource walk.
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    /// Per-directory ignore file name.
    pub ignore_file_name: String,
    /// Recognized extensions, without the leading dot.
    pub extensions: Vec<String>,
}

impl From<&DiscoveryConfig> for ResourceOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            ignore_file_name: config.ignore_file_name.clone(),
            extensions: config.resource_extensions.clone(),
        }
    }
}

/// Collect candidate resource files below `root`.
///
/// Entries whose name matches any active ignore pattern are dropped, which
/// also prevents descending into matching directories. Hidden entries and
/// unreadable directories are skipped. A directory reachable through several
/// paths (a symlink alias) is walked under each of them; only a directory that
/// resolves to one of its own ancestors is cut. The order of the returned paths
/// is unspecified; see [`resource_units`] for a sorted view.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover_resources(
    root: &Path,
    base_rules: &IgnoreRuleSet,
    options: &ResourceOptions,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack: Vec<(PathBuf, IgnoreRuleSet, Vec<PathBuf>)> =
        vec![(root.to_path_buf(), base_rules.clone(), Vec::new())];

    while let Some((dir, inherited, mut ancestors)) = stack.pop() {
        // A symlink back onto an ancestor would never terminate.
        if let Ok(canonical) = dir.canonicalize() {
            if ancestors.contains(&canonical) {
                debug!(dir = %dir.display(), "directory links back to an ancestor, skipping");
                continue;
            }
            ancestors.push(canonical);
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "unreadable directory, skipping");
                continue;
            }
        };

        let rules = inherited.extend_from_dir(&dir, &options.ignore_file_name);

        for entry in entries.filter_map(std::result::Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if rules.is_ignored(&name) {
                debug!(entry = %name, dir = %dir.display(), "excluded by ignore rules");
                continue;
            }
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            if path.is_dir() {
                stack.push((path, rules.clone(), ancestors.clone()));
            } else if has_recognized_extension(&path, &options.extensions) {
                files.push(path);
            }
        }
    }

    debug!(count = files.len(), "resource files discovered");
    files
}

/// Discover resource files and turn them into units sorted by their
/// normalized path relative to `root`.
pub fn resource_units(
    root: &Path,
    base_rules: &IgnoreRuleSet,
    options: &ResourceOptions,
) -> Vec<DiscoveryUnit> {
    let mut units: Vec<DiscoveryUnit> = discover_resources(root, base_rules, options)
        .into_iter()
        .filter_map(|path| {
            let display_name = relative_name(root, &path)?;
            Some(DiscoveryUnit::resource(
                path.to_string_lossy().into_owned(),
                display_name,
            ))
        })
        .collect();
    units.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    units
}

/// Path of `path` relative to `root`, joined with `/`.
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ResourceOptions {
        ResourceOptions::from(&DiscoveryConfig::default())
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "*** Keywords ***\n").unwrap();
    }

    fn names(root: &Path) -> Vec<String> {
        resource_units(root, &IgnoreRuleSet::new(), &options())
            .into_iter()
            .map(|u| u.display_name)
            .collect()
    }

    #[test]
    fn finds_recognized_extensions_only() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a/b.resource"));
        touch(&tmp.path().join("a/c.robot"));
        touch(&tmp.path().join("lib.py"));
        touch(&tmp.path().join("notes.txt"));
        touch(&tmp.path().join("image.png"));
        touch(&tmp.path().join("README"));

        assert_eq!(
            names(tmp.path()),
            ["a/b.resource", "a/c.robot", "lib.py", "notes.txt"]
        );
    }

    #[test]
    fn skips_hidden_entries() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join(".git/hooks.py"));
        touch(&tmp.path().join(".hidden.robot"));
        touch(&tmp.path().join("visible.robot"));

        assert_eq!(names(tmp.path()), ["visible.robot"]);
    }

    #[test]
    fn ignore_file_excludes_entries_and_subtrees() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a/b.resource"));
        touch(&tmp.path().join("a/c_dir/deep.resource"));
        touch(&tmp.path().join("a/copy.resource"));
        touch(&tmp.path().join("other/c.robot"));
        std::fs::write(tmp.path().join("a/.rfhubignore"), "# skip c*\n^c\n").unwrap();

        // The rule only applies below `a/`; `other/c.robot` survives.
        assert_eq!(names(tmp.path()), ["a/b.resource", "other/c.robot"]);
    }

    #[test]
    fn rules_are_inherited_by_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".rfhubignore"), "_old\n").unwrap();
        touch(&tmp.path().join("x/y/keep.resource"));
        touch(&tmp.path().join("x/y/keep_old.resource"));
        std::fs::write(tmp.path().join("x/.rfhubignore"), "tmp\n").unwrap();
        touch(&tmp.path().join("x/y/tmp.robot"));

        assert_eq!(names(tmp.path()), ["x/y/keep.resource"]);
    }

    #[test]
    fn base_rules_apply_from_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("vendor/lib.py"));
        touch(&tmp.path().join("suite.robot"));

        let base = IgnoreRuleSet::from_patterns(&["^vendor$"]).unwrap();
        let units = resource_units(tmp.path(), &base, &options());
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].display_name, "suite.robot");
        assert!(units[0].identifier.ends_with("suite.robot"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_alias_is_walked_alongside_its_target() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("shared/x.robot"));
        std::os::unix::fs::symlink(tmp.path().join("shared"), tmp.path().join("alias")).unwrap();

        assert_eq!(names(tmp.path()), ["alias/x.robot", "shared/x.robot"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_an_ancestor_does_not_loop() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a/x.robot"));
        touch(&tmp.path().join("top.robot"));
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("a/up")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("a"), tmp.path().join("a/self")).unwrap();

        assert_eq!(names(tmp.path()), ["a/x.robot", "top.robot"]);
    }

    #[test]
    fn relative_name_uses_forward_slashes() {
        let root = Path::new("/in");
        let path = Path::new("/in").join("a").join("b").join("c.robot");
        assert_eq!(relative_name(root, &path).as_deref(), Some("a/b/c.robot"));
        assert_eq!(relative_name(root, root), None);
    }
}
