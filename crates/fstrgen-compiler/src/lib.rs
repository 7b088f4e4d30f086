//! fstrgen compiler: the per-translation-unit reflection pipeline.
//!
//! # Example
//!
//! ```no_run
//! use fstrgen_compiler::{ParseOptions, rewrite};
//!
//! let source = std::fs::read_to_string("point.cpp").unwrap();
//! let result = rewrite(&source, "point.cpp", ParseOptions::default()).unwrap();
//! print!("{}", result.output);
//! ```
//!
//! The pipeline is a straight line: the [`frontend`] parses one C++ file,
//! the [`walker`] selects record and enum definitions and distills them
//! into declaration records, [`synth`] materialises the `to_string()` /
//! `format_as` fragments, and the insertion plan splices them back without
//! disturbing any other byte.

pub mod diagnostics;
pub mod eval;
pub mod frontend;
pub mod resolve;
pub mod rewrite;
pub mod synth;
pub mod walker;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod walker_tests;

pub use diagnostics::{DiagnosticMessage, Diagnostics, DiagnosticsPrinter, Severity};
pub use frontend::{CppFrontend, ParseOptions, ParsedUnit};
pub use rewrite::{Rewrite, RewriteError, rewrite};
pub use walker::{WalkOutput, walk};
