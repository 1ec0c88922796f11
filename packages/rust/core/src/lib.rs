//! Pipeline orchestration for kwdoc.
//!
//! This crate ties discovery, per-unit generation and index assembly into a
//! single run over a freshly rebuilt output directory (see [`pipeline::run`]).

pub mod assets;
pub mod index;
pub mod pipeline;

pub use assets::{STATIC_DIR_NAME, reset_output_dir};
pub use index::{JSON_INDEX_FILE, html_escape, render_index, render_json, write_index};
pub use pipeline::{
    ProgressReporter, RunSummary, SilentProgress, is_filesystem_root, output_file_for, run,
    validate_paths,
};
