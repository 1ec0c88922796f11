//! CLI definition, tracing setup, and the generation command.

use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;
use color_eyre::eyre::{Report, Result};
use indicatif::{ProgressBar, ProgressStyle};
use kwdoc_core::{ProgressReporter, RunSummary};
use kwdoc_libdoc::LibdocCommand;
use kwdoc_shared::{
    AppConfig, DiscoveryUnit, EXIT_ENVIRONMENT, EXIT_USAGE, GenerationResult, KwdocError, RunConfig,
    load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kwdoc — generate keyword documentation for libraries and resource files.
#[derive(Parser)]
#[command(
    name = "kwdoc",
    version,
    about = "Generate static keyword documentation for libraries and resource files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Directory scanned recursively for resource files.
    pub input: PathBuf,

    /// Directory to (re)create with the generated documentation.
    pub output: PathBuf,

    /// Distribution name prefixes of packages to document (replaces the configured list).
    pub prefixes: Vec<String>,

    /// Config file (defaults to ~/.kwdoc/kwdoc.toml).
    #[arg(long, env = "KWDOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kwdoc=info",
        1 => "kwdoc=debug",
        _ => "kwdoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Exit code for a failed argument parse: 0 for `--help`/`--version`.
pub(crate) fn parse_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_USAGE,
    }
}

/// Exit code for a failed run.
pub(crate) fn exit_code(report: &Report) -> u8 {
    report
        .downcast_ref::<KwdocError>()
        .map_or(EXIT_ENVIRONMENT, KwdocError::exit_code)
}

/// Resolve configuration, probe the compiler, and run the pipeline.
pub(crate) fn run(cli: Cli) -> Result<()> {
    // Argument errors take precedence over a broken config or a missing runtime.
    kwdoc_core::validate_paths(&cli.input, &cli.output)?;

    let app_config: AppConfig = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let config = RunConfig::new(&app_config, cli.input, cli.output, cli.prefixes);

    let compiler = LibdocCommand::new(&config.libdoc);
    compiler.probe()?;

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        prefixes = ?config.discovery.package_prefixes,
        "generating documentation"
    );

    let reporter = CliProgress::new();
    let summary = match kwdoc_core::run(&config, &compiler, &reporter) {
        Ok(summary) => summary,
        Err(e) => {
            reporter.spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    // Print summary
    println!();
    println!("  Documentation generated.");
    println!("  Libraries: {}", summary.libraries);
    println!("  Resources: {}", summary.resources);
    println!("  Skipped:   {}", summary.skipped);
    println!("  Index:     {}", summary.index_path.display());
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn unit_started(&self, unit: &DiscoveryUnit, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Documenting [{current}/{total}] {}", unit.display_name));
    }

    fn unit_finished(&self, _unit: &DiscoveryUnit, _result: Option<&GenerationResult>) {}

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}
