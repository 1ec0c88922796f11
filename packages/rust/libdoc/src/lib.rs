//! Documentation compiler integration for kwdoc.
//!
//! - [`DocCompiler`]: the capability to list keywords and write HTML pages,
//!   with [`LibdocCommand`] as the process-backed implementation.
//! - [`DocGenerator`]: turns one discovered unit into a [`GenerationResult`],
//!   isolating per-unit failures.
//! - [`encode`]: URL quoting shared by page links and keyword anchors.
//!
//! [`GenerationResult`]: kwdoc_shared::GenerationResult

pub mod compiler;
pub mod encode;
pub mod generator;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use compiler::{CompilerOutput, DocCompiler, LibdocCommand};
pub use encode::{anchor_url, path_url, quote};
pub use generator::{DocGenerator, parse_listing};
