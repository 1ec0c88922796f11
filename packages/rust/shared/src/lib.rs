//! Shared types, error model, and configuration for kwdoc.
//!
//! This crate is the foundation depended on by all other kwdoc crates.
//! It provides:
//! - [`KwdocError`] — the unified error type
//! - Domain types ([`DiscoveryUnit`], [`GenerationResult`], [`ResultAggregate`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DiscoveryConfig, LibdocConfig, OutputConfig, PackageStrategy, RunConfig,
    config_dir, config_file_path, load_config, load_config_from,
};
pub use error::{EXIT_ENVIRONMENT, EXIT_USAGE, KwdocError, Result};
pub use types::{DiscoveryUnit, GenerationResult, KeywordLink, ResultAggregate, UnitKind};
