//! End-to-end generation run: validate → reset output → discover → generate → index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use kwdoc_discovery::{IgnoreRuleSet, PackageFilter, discover_all, interpreter_site_dirs};
use kwdoc_libdoc::{DocCompiler, DocGenerator};
use kwdoc_shared::{
    DiscoveryUnit, GenerationResult, KwdocError, Result, ResultAggregate, RunConfig, UnitKind,
};

use crate::assets::reset_output_dir;
use crate::index::{JSON_INDEX_FILE, write_index};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Library pages listed in the index.
    pub libraries: usize,
    /// Resource pages listed in the index.
    pub resources: usize,
    /// Units that produced no page.
    pub skipped: usize,
    /// Path of the written index page.
    pub index_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a unit is handed to the compiler.
    fn unit_started(&self, unit: &DiscoveryUnit, current: usize, total: usize);
    /// Called after a unit was processed; `result` is `None` when it was skipped.
    fn unit_finished(&self, unit: &DiscoveryUnit, result: Option<&GenerationResult>);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn unit_started(&self, _unit: &DiscoveryUnit, _current: usize, _total: usize) {}
    fn unit_finished(&self, _unit: &DiscoveryUnit, _result: Option<&GenerationResult>) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Whether `path` names the root of a filesystem (`/`, `C:\`).
///
/// Existing paths are canonicalized first so `/tmp/..` is caught too.
pub fn is_filesystem_root(path: &Path) -> bool {
    let resolved = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    resolved.has_root() && resolved.parent().is_none()
}

/// Check both paths before anything is deleted.
///
/// Returns the canonical input directory.
pub fn validate_paths(input_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
    if output_dir.as_os_str().is_empty() {
        return Err(KwdocError::invalid_input("output directory must not be empty"));
    }
    if is_filesystem_root(output_dir) {
        return Err(KwdocError::UnsafeTarget {
            path: output_dir.to_path_buf(),
        });
    }

    if !input_dir.is_dir() {
        return Err(KwdocError::invalid_input(format!(
            "input directory {} does not exist or is not a directory",
            input_dir.display()
        )));
    }
    let input = input_dir
        .canonicalize()
        .map_err(|e| KwdocError::io(input_dir, e))?;

    if output_dir.exists() {
        if !output_dir.is_dir() {
            return Err(KwdocError::invalid_input(format!(
                "output path {} exists and is not a directory",
                output_dir.display()
            )));
        }
        let output = output_dir
            .canonicalize()
            .map_err(|e| KwdocError::io(output_dir, e))?;
        if input.starts_with(&output) {
            return Err(KwdocError::invalid_input(format!(
                "output directory {} contains the input directory",
                output_dir.display()
            )));
        }
    }

    Ok(input)
}

/// Where the page for `unit` is written.
///
/// Libraries land at `<out>/<Name>.html`; resource files mirror their
/// directory under the input root as `<out>/<dir>/<stem>.html`.
pub fn output_file_for(unit: &DiscoveryUnit, input_root: &Path, output_root: &Path) -> PathBuf {
    if unit.kind.is_library() {
        return output_root.join(format!("{}.html", unit.display_name));
    }

    let source = Path::new(&unit.source_path);
    let relative = source.strip_prefix(input_root).unwrap_or(source);
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| unit.display_name.clone());

    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            output_root.join(parent).join(format!("{stem}.html"))
        }
        _ => output_root.join(format!("{stem}.html")),
    }
}

/// Output files written by the index step, which no unit page may claim.
fn reserved_paths(output_root: &Path, config: &RunConfig) -> Vec<PathBuf> {
    let mut reserved = vec![output_root.join(&config.output.index_file)];
    if config.output.write_json_index {
        reserved.push(output_root.join(JSON_INDEX_FILE));
    }
    reserved
}

/// Run the full generation pipeline.
///
/// 1. Validate paths and configured patterns (nothing touched yet)
/// 2. Reset the output directory and write static assets
/// 3. Discover built-in, package and resource units
/// 4. Generate one page per unit, strictly one compiler call at a time
/// 5. Write the index
#[instrument(skip_all, fields(input = %config.input_dir.display(), output = %config.output_dir.display()))]
pub fn run(
    config: &RunConfig,
    compiler: &dyn DocCompiler,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();

    // --- Phase 1: Validation ---
    progress.phase("Validating paths");
    let input = validate_paths(&config.input_dir, &config.output_dir)?;
    IgnoreRuleSet::from_patterns(&config.discovery.base_ignore_patterns)?;
    PackageFilter::from_config(&config.discovery)?;

    let site_dirs = if config.discovery.site_packages.is_empty() {
        interpreter_site_dirs(&config.libdoc.interpreter)
    } else {
        config.discovery.site_packages.clone()
    };
    debug!(site_dirs = site_dirs.len(), "resolved package directories");

    // --- Phase 2: Output directory ---
    progress.phase("Preparing output directory");
    let output = config.output_dir.as_path();
    reset_output_dir(output, config.output.static_dir.as_deref())?;

    // --- Phase 3: Discovery ---
    progress.phase("Discovering libraries and resources");
    let units = discover_all(&input, &site_dirs, &config.discovery)?;

    // --- Phase 4: Generation ---
    progress.phase("Generating documentation");
    let generator = DocGenerator::new(compiler);
    let mut aggregate = ResultAggregate::new();
    let mut owners: HashMap<PathBuf, (UnitKind, String)> = HashMap::new();
    let mut skipped = 0usize;
    let total = units.len();
    let reserved = reserved_paths(output, config);

    for (i, unit) in units.iter().enumerate() {
        progress.unit_started(unit, i + 1, total);

        let out_file = output_file_for(unit, &input, output);
        if reserved.contains(&out_file) {
            warn!(
                unit = %unit.display_name,
                page = %out_file.display(),
                "page would be overwritten by the index, skipping"
            );
            progress.unit_finished(unit, None);
            skipped += 1;
            continue;
        }

        let result = generator.generate_unit(unit, output, &out_file)?;

        // The page of an earlier unit was overwritten or deleted.
        if result.is_some() || !out_file.exists() {
            if let Some((kind, name)) = owners.remove(&out_file) {
                if aggregate.remove(kind, &name).is_some() {
                    warn!(
                        page = %out_file.display(),
                        replaced = %name,
                        by = %unit.display_name,
                        "output page collision, keeping the later unit"
                    );
                }
            }
        }

        progress.unit_finished(unit, result.as_ref());

        match result {
            Some(result) => {
                owners.insert(out_file, (unit.kind, result.name.clone()));
                aggregate.insert(unit.kind, result);
            }
            None => {
                debug!(unit = %unit.display_name, kind = %unit.kind, "no page generated");
                skipped += 1;
            }
        }
    }

    // --- Phase 5: Index ---
    progress.phase("Writing index");
    let index_path = write_index(output, &config.output, &aggregate)?;

    let summary = RunSummary {
        libraries: aggregate.library_count(),
        resources: aggregate.resource_count(),
        skipped,
        index_path,
        elapsed: start.elapsed(),
    };

    info!(
        libraries = summary.libraries,
        resources = summary.resources,
        skipped = summary.skipped,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "generation complete"
    );

    progress.done(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_detected() {
        assert!(is_filesystem_root(Path::new("/")));
        assert!(!is_filesystem_root(Path::new("/tmp")));
        assert!(!is_filesystem_root(Path::new("relative/out")));
    }

    #[test]
    fn dotted_root_is_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dotted = tmp.path().to_path_buf();
        for _ in tmp.path().ancestors().skip(1) {
            dotted.push("..");
        }
        assert!(is_filesystem_root(&dotted));
    }

    #[test]
    fn library_pages_sit_at_the_root() {
        let unit = DiscoveryUnit::library("Collections", UnitKind::BuiltinLibrary);
        assert_eq!(
            output_file_for(&unit, Path::new("/in"), Path::new("/out")),
            PathBuf::from("/out/Collections.html")
        );
    }

    #[test]
    fn resource_pages_mirror_the_input_tree() {
        let nested = DiscoveryUnit::resource("/in/a/b/keys.resource", "a/b/keys.resource");
        assert_eq!(
            output_file_for(&nested, Path::new("/in"), Path::new("/out")),
            PathBuf::from("/out/a/b/keys.html")
        );

        let top = DiscoveryUnit::resource("/in/common.robot", "common.robot");
        assert_eq!(
            output_file_for(&top, Path::new("/in"), Path::new("/out")),
            PathBuf::from("/out/common.html")
        );
    }

    #[test]
    fn missing_input_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let err = validate_paths(&tmp.path().join("missing"), &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, KwdocError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn output_containing_input_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("docs/src");
        std::fs::create_dir_all(&input).unwrap();

        let err = validate_paths(&input, &tmp.path().join("docs")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = validate_paths(&input, &input).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn output_inside_input_is_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        let input = validate_paths(tmp.path(), &tmp.path().join("out")).unwrap();
        assert_eq!(input, tmp.path().canonicalize().unwrap());
    }
}
