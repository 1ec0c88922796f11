//! Scripted [`DocCompiler`] for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use kwdoc_shared::{KwdocError, Result};

use crate::compiler::{CompilerOutput, DocCompiler};
use crate::encode::quote;

/// Scripted behaviour for one source.
#[derive(Debug, Clone)]
pub struct FakeUnit {
    keywords: Vec<String>,
    listing_ok: bool,
    html_ok: bool,
}

impl FakeUnit {
    /// Lists `keywords` and writes a page.
    pub fn keywords(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            listing_ok: true,
            html_ok: true,
        }
    }

    /// Listing exits with an error.
    pub fn listing_fails() -> Self {
        Self {
            keywords: Vec::new(),
            listing_ok: false,
            html_ok: false,
        }
    }

    /// Lists `keywords`, then leaves a partial page and reports failure.
    pub fn html_fails(keywords: &[&str]) -> Self {
        Self {
            html_ok: false,
            ..Self::keywords(keywords)
        }
    }
}

/// In-memory compiler that records every call.
///
/// Sources without a scripted [`FakeUnit`] fail to list, like an unknown
/// library would.
#[derive(Debug, Default)]
pub struct FakeCompiler {
    units: HashMap<String, FakeUnit>,
    calls: RefCell<Vec<String>>,
    titles: RefCell<Vec<String>>,
}

impl FakeCompiler {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behaviour for `source`.
    pub fn with_unit(mut self, source: impl Into<String>, unit: FakeUnit) -> Self {
        self.units.insert(source.into(), unit);
        self
    }

    /// Calls made so far, as `list <source>` / `html <source>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Titles passed to HTML generation, in call order.
    pub fn titles(&self) -> Vec<String> {
        self.titles.borrow().clone()
    }
}

impl DocCompiler for FakeCompiler {
    fn list_keywords(&self, source: &str) -> Result<CompilerOutput> {
        self.calls.borrow_mut().push(format!("list {source}"));
        match self.units.get(source) {
            Some(unit) if unit.listing_ok => Ok(CompilerOutput::ok(unit.keywords.join("\n"))),
            Some(_) => Ok(CompilerOutput::failed(format!("cannot list {source}"))),
            None => Ok(CompilerOutput::failed(format!("no such library: {source}"))),
        }
    }

    fn generate_html(&self, source: &str, out_file: &Path, title: &str) -> Result<CompilerOutput> {
        self.calls.borrow_mut().push(format!("html {source}"));
        self.titles.borrow_mut().push(title.to_string());

        let Some(unit) = self.units.get(source) else {
            return Ok(CompilerOutput::failed(format!("no such library: {source}")));
        };

        if !unit.html_ok {
            std::fs::write(out_file, "<html><body>partial")
                .map_err(|e| KwdocError::io(out_file, e))?;
            return Ok(CompilerOutput::failed(format!("cannot document {source}")));
        }

        let anchors: String = unit
            .keywords
            .iter()
            .map(|k| format!("<h2 id=\"{}\">{k}</h2>\n", quote(k)))
            .collect();
        let page = format!("<html><head><title>{title}</title></head><body>\n{anchors}</body></html>\n");
        std::fs::write(out_file, page).map_err(|e| KwdocError::io(out_file, e))?;
        Ok(CompilerOutput::ok(""))
    }
}
