//! Source discovery for kwdoc.
//!
//! Three independent strategies produce [`DiscoveryUnit`]s:
//! - built-in framework libraries ([`libraries`]),
//! - libraries shipped by installed packages ([`packages`]),
//! - resource files found under the input directory ([`resources`]), filtered
//!   by per-directory ignore rules ([`ignore`]).

pub mod ignore;
pub mod libraries;
pub mod packages;
pub mod resources;

use std::path::{Path, PathBuf};

use tracing::info;

use kwdoc_shared::{DiscoveryConfig, DiscoveryUnit, Result};

pub use ignore::{IgnoreRuleSet, parse_ignore_lines};
pub use libraries::{BUILTIN_LIBRARIES, builtin_libraries, builtin_units};
pub use packages::{
    Distribution, MetadataInspector, PackageFilter, PackageInspector, TopLevelInspector,
    interpreter_site_dirs, package_libraries, package_units, probe_strategy, select_inspector,
};
pub use resources::{ResourceOptions, discover_resources, relative_name, resource_units};

/// Everything found for one run, grouped by strategy.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredUnits {
    /// Built-in libraries, sorted by name.
    pub builtins: Vec<DiscoveryUnit>,
    /// Installed-package libraries, sorted by name.
    pub packages: Vec<DiscoveryUnit>,
    /// Resource files, sorted by relative path.
    pub resources: Vec<DiscoveryUnit>,
}

impl DiscoveredUnits {
    /// Total number of units.
    pub fn len(&self) -> usize {
        self.builtins.len() + self.packages.len() + self.resources.len()
    }

    /// Whether nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Units in generation order: built-ins, packages, resources.
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveryUnit> {
        self.builtins
            .iter()
            .chain(&self.packages)
            .chain(&self.resources)
    }
}

/// Run all three discovery strategies.
///
/// `site_dirs` are the site-packages directories to inspect for package
/// libraries; `input_dir` is scanned for resource files.
pub fn discover_all(
    input_dir: &Path,
    site_dirs: &[PathBuf],
    config: &DiscoveryConfig,
) -> Result<DiscoveredUnits> {
    let base_rules = IgnoreRuleSet::from_patterns(&config.base_ignore_patterns)?;

    let units = DiscoveredUnits {
        builtins: builtin_units(&config.excluded_builtins),
        packages: package_units(site_dirs, config)?,
        resources: resource_units(input_dir, &base_rules, &ResourceOptions::from(config)),
    };

    info!(
        builtins = units.builtins.len(),
        packages = units.packages.len(),
        resources = units.resources.len(),
        "discovery complete"
    );

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwdoc_shared::UnitKind;

    #[test]
    fn discover_all_orders_builtins_packages_resources() {
        let input = tempfile::tempdir().unwrap();
        std::fs::write(input.path().join("suite.robot"), "").unwrap();
        let site = tempfile::tempdir().unwrap();

        let units = discover_all(
            input.path(),
            &[site.path().to_path_buf()],
            &DiscoveryConfig::default(),
        )
        .unwrap();

        assert!(units.packages.is_empty());
        assert_eq!(units.resources.len(), 1);
        let kinds: Vec<_> = units.iter().map(|u| u.kind).collect();
        assert_eq!(kinds.first(), Some(&UnitKind::BuiltinLibrary));
        assert_eq!(kinds.last(), Some(&UnitKind::ResourceFile));
        assert_eq!(units.len(), units.builtins.len() + 1);
    }
}
