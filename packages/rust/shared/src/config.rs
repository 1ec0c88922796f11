//! Application configuration for kwdoc.
//!
//! User config lives at `~/.kwdoc/kwdoc.toml`.
//! CLI arguments override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KwdocError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "kwdoc.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".kwdoc";

// ---------------------------------------------------------------------------
// Config structs (matching kwdoc.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documentation compiler invocation.
    #[serde(default)]
    pub libdoc: LibdocConfig,

    /// Library and resource discovery.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Output tree settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[libdoc]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibdocConfig {
    /// Interpreter used to run the documentation compiler.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Module run with `-m`.
    #[serde(default = "default_module")]
    pub module: String,
}

impl Default for LibdocConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            module: default_module(),
        }
    }
}

fn default_interpreter() -> String {
    "python3".into()
}
fn default_module() -> String {
    "robot.libdoc".into()
}

/// How installed packages are inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageStrategy {
    /// Probe the site directories and pick the richest strategy available.
    #[default]
    Auto,
    /// Read `*.dist-info/METADATA` and `RECORD`.
    Metadata,
    /// Read `top_level.txt` from `*.dist-info` / `*.egg-info`.
    TopLevel,
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Distribution name prefixes that mark a package as a keyword library.
    #[serde(default = "default_package_prefixes")]
    pub package_prefixes: Vec<String>,

    /// Built-in libraries never documented.
    #[serde(default = "default_excluded_builtins")]
    pub excluded_builtins: Vec<String>,

    /// Top-level modules dropped from package discovery (exact names).
    #[serde(default = "default_excluded_modules")]
    pub excluded_modules: Vec<String>,

    /// Top-level modules dropped from package discovery (regex).
    #[serde(default = "default_excluded_module_patterns")]
    pub excluded_module_patterns: Vec<String>,

    /// Per-directory ignore file name.
    #[serde(default = "default_ignore_file_name")]
    pub ignore_file_name: String,

    /// Ignore patterns applied from the input root downwards.
    #[serde(default)]
    pub base_ignore_patterns: Vec<String>,

    /// File extensions (without dot) treated as resource files.
    #[serde(default = "default_resource_extensions")]
    pub resource_extensions: Vec<String>,

    /// Site-packages directories to inspect; empty asks the interpreter.
    #[serde(default)]
    pub site_packages: Vec<PathBuf>,

    /// Package inspection strategy.
    #[serde(default)]
    pub strategy: PackageStrategy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            package_prefixes: default_package_prefixes(),
            excluded_builtins: default_excluded_builtins(),
            excluded_modules: default_excluded_modules(),
            excluded_module_patterns: default_excluded_module_patterns(),
            ignore_file_name: default_ignore_file_name(),
            base_ignore_patterns: Vec::new(),
            resource_extensions: default_resource_extensions(),
            site_packages: Vec::new(),
            strategy: PackageStrategy::default(),
        }
    }
}

fn default_package_prefixes() -> Vec<String> {
    vec!["robotframework".into()]
}
fn default_excluded_builtins() -> Vec<String> {
    vec!["Easter".into(), "Reserved".into()]
}
fn default_excluded_modules() -> Vec<String> {
    vec!["robot".into()]
}
fn default_excluded_module_patterns() -> Vec<String> {
    vec!["^rfhub".into(), "^kwdoc".into()]
}
fn default_ignore_file_name() -> String {
    ".rfhubignore".into()
}
fn default_resource_extensions() -> Vec<String> {
    ["resource", "txt", "py", "robot"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the aggregate index page.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Also write `index.json` next to the index page.
    #[serde(default = "default_true")]
    pub write_json_index: bool,

    /// Directory copied to `<output>/static` instead of the bundled assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
            write_json_index: true,
            static_dir: None,
        }
    }
}

fn default_index_file() -> String {
    "index.html".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI arguments)
// ---------------------------------------------------------------------------

/// Runtime configuration for one generation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory scanned for resource files.
    pub input_dir: PathBuf,
    /// Directory rebuilt from scratch with the generated documentation.
    pub output_dir: PathBuf,
    /// Compiler invocation.
    pub libdoc: LibdocConfig,
    /// Discovery settings, with CLI prefixes already applied.
    pub discovery: DiscoveryConfig,
    /// Output tree settings.
    pub output: OutputConfig,
}

impl RunConfig {
    /// Merge CLI arguments over a loaded config.
    ///
    /// Non-empty `package_prefixes` replace the configured list.
    pub fn new(
        config: &AppConfig,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        package_prefixes: Vec<String>,
    ) -> Self {
        let mut discovery = config.discovery.clone();
        if !package_prefixes.is_empty() {
            discovery.package_prefixes = package_prefixes;
        }
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            libdoc: config.libdoc.clone(),
            discovery,
            output: config.output.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.kwdoc/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| KwdocError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.kwdoc/kwdoc.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| KwdocError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| KwdocError::config(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("robot.libdoc"));
        assert!(toml_str.contains(".rfhubignore"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[libdoc]
interpreter = "/opt/venv/bin/python"

[discovery]
package_prefixes = ["robotframework", "acme-robot"]
strategy = "top-level"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.libdoc.interpreter, "/opt/venv/bin/python");
        assert_eq!(config.libdoc.module, "robot.libdoc");
        assert_eq!(config.discovery.package_prefixes.len(), 2);
        assert_eq!(config.discovery.strategy, PackageStrategy::TopLevel);
        assert_eq!(config.discovery.excluded_builtins, ["Easter", "Reserved"]);
        assert_eq!(config.output.index_file, "index.html");
    }

    #[test]
    fn cli_prefixes_replace_configured_ones() {
        let app = AppConfig::default();
        let run = RunConfig::new(&app, "in", "out", vec!["acme".into()]);
        assert_eq!(run.discovery.package_prefixes, ["acme"]);

        let run = RunConfig::new(&app, "in", "out", Vec::new());
        assert_eq!(run.discovery.package_prefixes, ["robotframework"]);
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kwdoc.toml");
        std::fs::write(&path, "[libdoc\ninterpreter = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
