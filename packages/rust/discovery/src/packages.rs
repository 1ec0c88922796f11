//! Installed-package library enumeration.
//!
//! Two inspectors read installed distributions from site-packages directories:
//! - [`MetadataInspector`] reads `*.dist-info/METADATA` and `RECORD` (preferred).
//! - [`TopLevelInspector`] reads `top_level.txt` from `*.dist-info` and
//!   `*.egg-info` directories, for environments without `RECORD` files.
//!
//! [`select_inspector`] picks one by probing the site directories, and
//! [`package_libraries`] applies the name-prefix filter and exclusions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use kwdoc_shared::{DiscoveryConfig, DiscoveryUnit, KwdocError, PackageStrategy, Result, UnitKind};

/// Runs of separators that are equivalent in distribution names.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator regex"));

/// Matches an `extra == "..."` environment marker.
static EXTRA_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"extra\s*=="#).expect("extra marker regex"));

/// Prints the interpreter's module search path, one entry per line.
const SYS_PATH_SCRIPT: &str = "import sys; print('\\n'.join(p for p in sys.path if p))";

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// What an inspector learned about one installed distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    /// Declared distribution name.
    pub name: String,
    /// Raw requirement strings (`Requires-Dist` / `requires.txt`).
    pub requires: Vec<String>,
    /// Top-level importable modules installed by the distribution.
    pub modules: Vec<String>,
}

// ---------------------------------------------------------------------------
// Inspectors
// ---------------------------------------------------------------------------

/// Reads installed distributions from one site-packages directory.
pub trait PackageInspector {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// All distributions found in `site_dir`. Unreadable metadata is skipped.
    fn distributions(&self, site_dir: &Path) -> Vec<Distribution>;
}

/// Inspector backed by `METADATA` and `RECORD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataInspector;

impl PackageInspector for MetadataInspector {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn distributions(&self, site_dir: &Path) -> Vec<Distribution> {
        metadata_dirs(site_dir, &["dist-info"])
            .into_iter()
            .filter_map(|dir| {
                let metadata = read_optional(&dir.join("METADATA"))?;
                let (name, requires) = parse_metadata(&metadata);
                let record = read_optional(&dir.join("RECORD")).unwrap_or_default();
                Some(Distribution {
                    name: name.unwrap_or_else(|| name_from_dir(&dir)),
                    requires,
                    modules: modules_from_record(&record),
                })
            })
            .collect()
    }
}

/// Inspector backed by `top_level.txt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopLevelInspector;

impl PackageInspector for TopLevelInspector {
    fn name(&self) -> &'static str {
        "top-level"
    }

    fn distributions(&self, site_dir: &Path) -> Vec<Distribution> {
        metadata_dirs(site_dir, &["dist-info", "egg-info"])
            .into_iter()
            .map(|dir| {
                let metadata = read_optional(&dir.join("METADATA"))
                    .or_else(|| read_optional(&dir.join("PKG-INFO")))
                    .unwrap_or_default();
                let (name, mut requires) = parse_metadata(&metadata);
                if let Some(egg_requires) = read_optional(&dir.join("requires.txt")) {
                    requires.extend(parse_egg_requires(&egg_requires));
                }
                let modules: Vec<String> = read_optional(&dir.join("top_level.txt"))
                    .map(|content| {
                        content
                            .lines()
                            .map(str::trim)
                            .filter(|l| !l.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                Distribution {
                    name: name.unwrap_or_else(|| name_from_dir(&dir)),
                    requires,
                    modules,
                }
            })
            .collect()
    }
}

/// Strategy the probe settles on for these site directories.
///
/// Metadata when any `*.dist-info` carries a `RECORD`, otherwise top-level.
pub fn probe_strategy(site_dirs: &[PathBuf]) -> PackageStrategy {
    let has_record = site_dirs.iter().any(|site| {
        metadata_dirs(site, &["dist-info"])
            .iter()
            .any(|dir| dir.join("RECORD").is_file())
    });
    if has_record {
        PackageStrategy::Metadata
    } else {
        PackageStrategy::TopLevel
    }
}

/// Resolve the configured strategy into an inspector.
pub fn select_inspector(
    strategy: PackageStrategy,
    site_dirs: &[PathBuf],
) -> Box<dyn PackageInspector> {
    let resolved = match strategy {
        PackageStrategy::Auto => probe_strategy(site_dirs),
        other => other,
    };
    match resolved {
        PackageStrategy::TopLevel => Box::new(TopLevelInspector),
        _ => Box::new(MetadataInspector),
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Decides which distributions and modules count as keyword libraries.
#[derive(Debug, Clone)]
pub struct PackageFilter {
    prefixes: Vec<String>,
    excluded_modules: Vec<String>,
    excluded_patterns: Vec<Regex>,
}

impl PackageFilter {
    /// Build the filter from discovery settings.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        let excluded_patterns = config
            .excluded_module_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    KwdocError::config(format!("invalid module exclusion pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            prefixes: config
                .package_prefixes
                .iter()
                .map(|p| normalize_name(p))
                .filter(|p| !p.is_empty())
                .collect(),
            excluded_modules: config.excluded_modules.clone(),
            excluded_patterns,
        })
    }

    /// A distribution qualifies when its name starts with a prefix or it
    /// requires a distribution named exactly like a prefix.
    pub fn qualifies(&self, dist: &Distribution) -> bool {
        let name = normalize_name(&dist.name);
        if self.prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return true;
        }
        dist.requires
            .iter()
            .filter(|req| !EXTRA_MARKER_RE.is_match(req))
            .filter_map(|req| requirement_name(req))
            .any(|req| self.prefixes.contains(&req))
    }

    /// Whether a top-level module survives the exclusion lists.
    pub fn keeps_module(&self, module: &str) -> bool {
        !self.excluded_modules.iter().any(|m| m == module)
            && !self.excluded_patterns.iter().any(|re| re.is_match(module))
    }
}

/// Library names provided by qualifying installed packages, de-duplicated
/// and sorted.
#[instrument(skip_all, fields(site_dirs = site_dirs.len()))]
pub fn package_libraries(site_dirs: &[PathBuf], config: &DiscoveryConfig) -> Result<Vec<String>> {
    let filter = PackageFilter::from_config(config)?;
    let inspector = select_inspector(config.strategy, site_dirs);
    info!(strategy = inspector.name(), "inspecting installed packages");

    let mut names = BTreeSet::new();
    for site in site_dirs {
        for dist in inspector.distributions(site) {
            if !filter.qualifies(&dist) {
                continue;
            }
            debug!(distribution = %dist.name, modules = dist.modules.len(), "qualifying package");
            names.extend(
                dist.modules
                    .into_iter()
                    .filter(|module| filter.keeps_module(module)),
            );
        }
    }

    Ok(names.into_iter().collect())
}

/// Package libraries as discovery units.
pub fn package_units(site_dirs: &[PathBuf], config: &DiscoveryConfig) -> Result<Vec<DiscoveryUnit>> {
    Ok(package_libraries(site_dirs, config)?
        .into_iter()
        .map(|name| DiscoveryUnit::library(name, UnitKind::PackageLibrary))
        .collect())
}

/// Ask `interpreter` for its module search path and keep existing directories.
///
/// Best effort: any failure yields an empty list.
pub fn interpreter_site_dirs(interpreter: &str) -> Vec<PathBuf> {
    let output = Command::new(interpreter)
        .args(["-c", SYS_PATH_SCRIPT])
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .collect(),
        Ok(output) => {
            warn!(interpreter, status = ?output.status, "could not read interpreter search path");
            Vec::new()
        }
        Err(e) => {
            warn!(interpreter, error = %e, "could not run interpreter");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Lowercase a distribution name and collapse separator runs to `-`.
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Normalized distribution name at the start of a requirement string.
fn requirement_name(requirement: &str) -> Option<String> {
    let name: String = requirement
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(normalize_name(&name))
    }
}

/// `Name` and `Requires-Dist` from an RFC 822 style metadata header block.
fn parse_metadata(content: &str) -> (Option<String>, Vec<String>) {
    let mut name = None;
    let mut requires = Vec::new();
    for line in content.lines() {
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "Name" if name.is_none() => name = Some(value.trim().to_string()),
            "Requires-Dist" => requires.push(value.trim().to_string()),
            _ => {}
        }
    }
    (name, requires)
}

/// Unconditional requirements from an egg `requires.txt`.
fn parse_egg_requires(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .take_while(|l| !l.starts_with('['))
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Top-level module names of the `.py` files listed in a `RECORD`.
fn modules_from_record(record: &str) -> Vec<String> {
    let mut modules = BTreeSet::new();
    for line in record.lines() {
        let path = record_path(line);
        if !path.ends_with(".py") {
            continue;
        }
        let mut parts = path.split('/');
        let Some(first) = parts.next() else {
            continue;
        };
        let is_single = parts.next().is_none();
        if first.is_empty()
            || first.starts_with("..")
            || first == "__pycache__"
            || [".dist-info", ".egg-info", ".data"]
                .iter()
                .any(|suffix| first.ends_with(suffix))
        {
            continue;
        }
        let module = if is_single {
            first.trim_end_matches(".py")
        } else {
            first
        };
        modules.insert(module.to_string());
    }
    modules.into_iter().collect()
}

/// First CSV field of a `RECORD` line.
fn record_path(line: &str) -> &str {
    if let Some(quoted) = line.strip_prefix('"') {
        quoted.split('"').next().unwrap_or_default()
    } else {
        line.split(',').next().unwrap_or_default()
    }
}

/// Distribution name guessed from a `name-version.dist-info` directory.
fn name_from_dir(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Metadata directories with one of the given suffixes, sorted by name.
fn metadata_dirs(site_dir: &Path, suffixes: &[&str]) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(site_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %site_dir.display(), error = %e, "unreadable site directory");
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_dir()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| suffixes.contains(&ext))
        })
        .collect();
    dirs.sort();
    dirs
}

/// File content, or `None` when missing or unreadable.
fn read_optional(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            if path.exists() {
                debug!(path = %path.display(), error = %e, "unreadable package metadata");
            }
            None
        }
    }
}
