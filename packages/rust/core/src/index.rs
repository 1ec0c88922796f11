//! Aggregate index rendering.
//!
//! The page is built by plain string assembly so the output is byte-stable
//! across runs: sections are sorted, keyword lists are sorted, and nothing
//! time-dependent is embedded.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use kwdoc_shared::{GenerationResult, KwdocError, OutputConfig, Result, ResultAggregate};

use crate::assets::STATIC_DIR_NAME;

/// File name of the machine-readable index.
pub const JSON_INDEX_FILE: &str = "index.json";

/// Serialized form of `index.json`.
#[derive(Debug, Serialize)]
struct JsonIndex<'a> {
    version: &'a str,
    libraries: Vec<&'a GenerationResult>,
    resources: Vec<&'a GenerationResult>,
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the index page for `aggregate`.
pub fn render_index(aggregate: &ResultAggregate, version: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Keyword Documentation</title>\n");
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{STATIC_DIR_NAME}/style.css\">"
    );
    html.push_str("</head>\n<body>\n<header>\n<h1>Keyword Documentation</h1>\n");
    html.push_str(
        "<input id=\"filter\" type=\"search\" placeholder=\"Filter keywords\" autocomplete=\"off\">\n",
    );
    html.push_str("</header>\n<main>\n");

    render_section(&mut html, "libraries", "Libraries", &aggregate.libraries());
    render_section(&mut html, "resources", "Resource files", &aggregate.resources());

    html.push_str("</main>\n");
    let _ = writeln!(
        html,
        "<footer>Generated by kwdoc {}</footer>",
        html_escape(version)
    );
    let _ = writeln!(html, "<script src=\"{STATIC_DIR_NAME}/filter.js\"></script>");
    html.push_str("</body>\n</html>\n");
    html
}

fn render_section(html: &mut String, id: &str, heading: &str, results: &[&GenerationResult]) {
    let _ = writeln!(html, "<section class=\"column\" id=\"{id}\">");
    let _ = writeln!(html, "<h2>{heading}</h2>");

    if results.is_empty() {
        html.push_str("<p class=\"empty\">None found.</p>\n");
    }

    for result in results {
        let name = html_escape(&result.name);
        let _ = writeln!(html, "<div class=\"unit\" data-name=\"{name}\">");
        let _ = writeln!(
            html,
            "<h3><a href=\"{}\">{name}</a> <span class=\"count\">({})</span></h3>",
            html_escape(&result.output_url),
            result.keywords.len()
        );
        html.push_str("<ul class=\"keywords\">\n");
        for keyword in &result.keywords {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                html_escape(&keyword.anchor_url),
                html_escape(&keyword.name)
            );
        }
        html.push_str("</ul>\n</div>\n");
    }

    html.push_str("</section>\n");
}

/// Render `index.json` for `aggregate`.
pub fn render_json(aggregate: &ResultAggregate, version: &str) -> Result<String> {
    let index = JsonIndex {
        version,
        libraries: aggregate.libraries(),
        resources: aggregate.resources(),
    };
    let mut json = serde_json::to_string_pretty(&index)
        .map_err(|e| KwdocError::Render(format!("failed to serialize index: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Write the index page (and optionally `index.json`) into `out_dir`.
///
/// Returns the path of the index page.
#[instrument(skip_all, fields(out_dir = %out_dir.display()))]
pub fn write_index(
    out_dir: &Path,
    output: &OutputConfig,
    aggregate: &ResultAggregate,
) -> Result<PathBuf> {
    let version = env!("CARGO_PKG_VERSION");

    let index_path = out_dir.join(&output.index_file);
    std::fs::write(&index_path, render_index(aggregate, version))
        .map_err(|e| KwdocError::io(&index_path, e))?;

    if output.write_json_index {
        let json_path = out_dir.join(JSON_INDEX_FILE);
        std::fs::write(&json_path, render_json(aggregate, version)?)
            .map_err(|e| KwdocError::io(&json_path, e))?;
        debug!(path = %json_path.display(), "wrote JSON index");
    }

    info!(
        path = %index_path.display(),
        libraries = aggregate.library_count(),
        resources = aggregate.resource_count(),
        "wrote index"
    );
    Ok(index_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwdoc_shared::{KeywordLink, UnitKind};

    fn result(name: &str, url: &str, keywords: &[&str]) -> GenerationResult {
        GenerationResult {
            name: name.into(),
            path: name.into(),
            output_url: url.into(),
            keywords: keywords
                .iter()
                .map(|k| KeywordLink {
                    name: (*k).into(),
                    anchor_url: format!("{url}#{}", k.replace(' ', "%20")),
                })
                .collect(),
        }
    }

    fn sample() -> ResultAggregate {
        let mut agg = ResultAggregate::new();
        agg.insert(UnitKind::BuiltinLibrary, result("String", "String.html", &["Get Length"]));
        agg.insert(UnitKind::BuiltinLibrary, result("BuiltIn", "BuiltIn.html", &["Log", "No Operation"]));
        agg.insert(UnitKind::ResourceFile, result("a/b.resource", "a/b.html", &["Open <App>"]));
        agg
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
    }

    #[test]
    fn index_lists_sections_in_sorted_order() {
        let html = render_index(&sample(), "0.1.0");

        let builtin = html.find("href=\"BuiltIn.html\"").expect("BuiltIn link");
        let string = html.find("href=\"String.html\"").expect("String link");
        let resource = html.find("href=\"a/b.html\"").expect("resource link");
        assert!(builtin < string);
        assert!(string < resource);

        assert!(html.contains("<a href=\"BuiltIn.html#No%20Operation\">No Operation</a>"));
        assert!(html.contains("Open &lt;App&gt;"));
        assert!(html.contains("static/filter.js"));
        assert!(html.contains("kwdoc 0.1.0"));
    }

    #[test]
    fn empty_sections_are_marked() {
        let html = render_index(&ResultAggregate::new(), "0.1.0");
        assert_eq!(html.matches("None found.").count(), 2);
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_index(&sample(), "1"), render_index(&sample(), "1"));
    }

    #[test]
    fn json_index_uses_url_fields() {
        let json = render_json(&sample(), "0.1.0").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["libraries"][0]["name"], "BuiltIn");
        assert_eq!(value["libraries"][0]["keywords"][1]["url"], "BuiltIn.html#No%20Operation");
        assert_eq!(value["resources"][0]["url"], "a/b.html");
    }

    #[test]
    fn write_index_honours_output_config() {
        let tmp = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            index_file: "keywords.html".into(),
            write_json_index: false,
            static_dir: None,
        };

        let path = write_index(tmp.path(), &output, &sample()).unwrap();

        assert_eq!(path, tmp.path().join("keywords.html"));
        assert!(path.is_file());
        assert!(!tmp.path().join(JSON_INDEX_FILE).exists());
    }
}
