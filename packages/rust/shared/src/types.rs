//! Core domain types for kwdoc documentation runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DiscoveryUnit
// ---------------------------------------------------------------------------

/// Where a unit was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// A library shipped with the automation framework.
    BuiltinLibrary,
    /// A library found among installed packages.
    PackageLibrary,
    /// A resource file found under the input directory.
    ResourceFile,
}

impl UnitKind {
    /// Whether the unit is documented in the libraries section.
    pub fn is_library(self) -> bool {
        matches!(self, Self::BuiltinLibrary | Self::PackageLibrary)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BuiltinLibrary => "built-in library",
            Self::PackageLibrary => "package library",
            Self::ResourceFile => "resource file",
        };
        f.write_str(s)
    }
}

/// One discoverable source that may yield a generated documentation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryUnit {
    /// What the documentation compiler is invoked with: a library name or
    /// an absolute file path.
    pub identifier: String,
    /// Where the unit came from on disk, if anywhere.
    pub source_path: String,
    /// Key in the aggregate: the library name, or the resource path relative
    /// to the input root with `/` separators.
    pub display_name: String,
    /// Discovery strategy that produced the unit.
    pub kind: UnitKind,
}

impl DiscoveryUnit {
    /// A library unit; libraries are addressed by name only.
    pub fn library(name: impl Into<String>, kind: UnitKind) -> Self {
        let name = name.into();
        Self {
            identifier: name.clone(),
            source_path: name.clone(),
            display_name: name,
            kind,
        }
    }

    /// A resource file unit.
    pub fn resource(path: impl Into<String>, display_name: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            identifier: path.clone(),
            source_path: path,
            display_name: display_name.into(),
            kind: UnitKind::ResourceFile,
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationResult
// ---------------------------------------------------------------------------

/// A keyword and the anchor URL pointing at it inside the generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLink {
    /// Keyword name as listed by the compiler.
    pub name: String,
    /// `<page url>#<encoded keyword>`.
    #[serde(rename = "url")]
    pub anchor_url: String,
}

/// A successfully generated documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Display name of the unit.
    pub name: String,
    /// Identifier the compiler was invoked with.
    pub path: String,
    /// Percent-encoded page path relative to the output root.
    #[serde(rename = "url")]
    pub output_url: String,
    /// Keywords in sorted order.
    pub keywords: Vec<KeywordLink>,
}

// ---------------------------------------------------------------------------
// ResultAggregate
// ---------------------------------------------------------------------------

/// All results of a run, keyed by display name.
///
/// Built-in and package libraries are stored apart so that a package library
/// always supersedes a built-in of the same name, whatever the insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregate {
    builtins: BTreeMap<String, GenerationResult>,
    packages: BTreeMap<String, GenerationResult>,
    resources: BTreeMap<String, GenerationResult>,
}

impl ResultAggregate {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; returns the result previously stored under the same
    /// name for the same kind.
    pub fn insert(&mut self, kind: UnitKind, result: GenerationResult) -> Option<GenerationResult> {
        let map = match kind {
            UnitKind::BuiltinLibrary => &mut self.builtins,
            UnitKind::PackageLibrary => &mut self.packages,
            UnitKind::ResourceFile => &mut self.resources,
        };
        map.insert(result.name.clone(), result)
    }

    /// Drop the result stored under `name` for `kind`.
    pub fn remove(&mut self, kind: UnitKind, name: &str) -> Option<GenerationResult> {
        match kind {
            UnitKind::BuiltinLibrary => self.builtins.remove(name),
            UnitKind::PackageLibrary => self.packages.remove(name),
            UnitKind::ResourceFile => self.resources.remove(name),
        }
    }

    /// Libraries sorted by name, package libraries overriding built-ins.
    pub fn libraries(&self) -> Vec<&GenerationResult> {
        let mut merged: BTreeMap<&str, &GenerationResult> = self
            .builtins
            .iter()
            .map(|(name, result)| (name.as_str(), result))
            .collect();
        merged.extend(
            self.packages
                .iter()
                .map(|(name, result)| (name.as_str(), result)),
        );
        merged.into_values().collect()
    }

    /// Resource files sorted by display name.
    pub fn resources(&self) -> Vec<&GenerationResult> {
        self.resources.values().collect()
    }

    /// Number of distinct library entries.
    pub fn library_count(&self) -> usize {
        self.libraries().len()
    }

    /// Number of resource entries.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }
}
