//! Error types for the runner module.
//!
//! Kept in their own file so the derive-macro lint suppression stays narrow.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. FIXME(rust-lang/rust#130021): remove once
// upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing a generator run.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A path handed to the generator is not valid UTF-8.
    #[error("path '{}' is not valid UTF-8", .path.display())]
    #[diagnostic(
        code(ninjatree::runner::non_utf8_path),
        help("Ninja files are written as UTF-8; rename the directory or pick another one")
    )]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },
}
