//! Per-unit documentation generation.
//!
//! A unit first has its keywords listed; only when that yields at least one
//! keyword is its HTML page written. Compiler failures withhold the result for
//! that unit and never abort the batch. Only failing to create the output
//! directory is reported as an error.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use kwdoc_shared::{DiscoveryUnit, GenerationResult, KeywordLink, KwdocError, Result};

use crate::compiler::DocCompiler;
use crate::encode::{anchor_url, path_url};

/// Generates one documentation page at a time through a [`DocCompiler`].
pub struct DocGenerator<'a> {
    compiler: &'a dyn DocCompiler,
}

impl<'a> DocGenerator<'a> {
    /// Wrap a compiler.
    pub fn new(compiler: &'a dyn DocCompiler) -> Self {
        Self { compiler }
    }

    /// Generate the page for a discovered unit.
    pub fn generate_unit(
        &self,
        unit: &DiscoveryUnit,
        out_dir: &Path,
        out_file: &Path,
    ) -> Result<Option<GenerationResult>> {
        self.generate(&unit.identifier, out_dir, out_file, &unit.display_name)
    }

    /// Generate the page for `source` into `out_file`.
    ///
    /// Returns `Ok(None)` when the source has no keywords or the compiler
    /// fails; in that case no file is left at `out_file`. The result's URLs
    /// are relative to `out_dir`.
    #[instrument(skip_all, fields(source = %source, name = %display_name))]
    pub fn generate(
        &self,
        source: &str,
        out_dir: &Path,
        out_file: &Path,
        display_name: &str,
    ) -> Result<Option<GenerationResult>> {
        // --- Step 1: list keywords ---
        let listing = match self.compiler.list_keywords(source) {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!(stderr = %output.stderr.trim(), "keyword listing failed");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, "keyword listing failed");
                return Ok(None);
            }
        };

        let keywords = parse_listing(&listing.stdout);
        if keywords.is_empty() {
            debug!("no keywords listed, skipping");
            return Ok(None);
        }

        // --- Step 2: write the page ---
        create_dir(out_dir)?;
        if let Some(parent) = out_file.parent() {
            create_dir(parent)?;
        }

        let title = display_name.rsplit('/').next().unwrap_or(display_name);
        let generated = match self.compiler.generate_html(source, out_file, title) {
            Ok(output) => {
                if !output.success {
                    warn!(stderr = %output.stderr.trim(), "HTML generation failed");
                }
                output.success
            }
            Err(e) => {
                warn!(error = %e, "HTML generation failed");
                false
            }
        };

        // --- Step 3: drop partial output ---
        if !generated && out_file.exists() {
            if let Err(e) = std::fs::remove_file(out_file) {
                warn!(path = %out_file.display(), error = %e, "could not remove partial page");
            }
        }

        // --- Step 4: build the result ---
        if !generated || !out_file.exists() {
            return Ok(None);
        }

        let relative = out_file.strip_prefix(out_dir).unwrap_or(out_file);
        let output_url = path_url(relative);
        let keywords: Vec<KeywordLink> = keywords
            .into_iter()
            .map(|name| KeywordLink {
                anchor_url: anchor_url(&output_url, &name),
                name,
            })
            .collect();

        info!(
            path = %out_file.display(),
            keywords = keywords.len(),
            "created documentation page"
        );

        Ok(Some(GenerationResult {
            name: display_name.to_string(),
            path: source.to_string(),
            output_url,
            keywords,
        }))
    }
}

/// Keyword names from a listing: one per line, blank lines dropped, sorted.
pub fn parse_listing(stdout: &str) -> Vec<String> {
    let mut lines: Vec<String> = stdout
        .trim()
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect();
    lines.sort();
    lines
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| KwdocError::io(dir, e))
}
