//! Errors raised while loading the `build.toml` tree.
//!
//! [`ManifestError`] covers every failure of the tree walk and target
//! construction. TOML syntax and schema errors are mapped by
//! [`map_toml_error`] into a [`miette`] diagnostic carrying the offending
//! source span.

// Module-level suppression for version-dependent lint false positives from
// miette/thiserror derive macros. FIXME: remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Error raised while loading the configuration tree.
#[derive(Debug, Error, Diagnostic)]
pub enum ManifestError {
    /// A directory listed in `subdirs` (or the root) has no `build.toml`.
    #[error("build file not found: {path}")]
    #[diagnostic(
        code(ninjatree::manifest::not_found),
        help("every directory listed in `subdirs` needs its own build.toml")
    )]
    ConfigNotFound {
        /// Path that was attempted.
        path: Utf8PathBuf,
    },

    /// The build file exists but could not be read.
    #[error("failed to read {path}")]
    #[diagnostic(code(ninjatree::manifest::read))]
    ConfigRead {
        /// Path that was attempted.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The build file is not valid TOML or does not match the schema.
    #[error("failed to parse {path}")]
    #[diagnostic(code(ninjatree::manifest::parse))]
    ConfigParse {
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Diagnostic pointing at the offending span.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// The requested preset is not declared by the root build file.
    #[error("no preset named '{preset}' (available: {})", .available.join(", "))]
    #[diagnostic(code(ninjatree::manifest::unknown_preset))]
    UnknownPreset {
        /// Requested preset name.
        preset: String,
        /// Presets declared in the root build file.
        available: Vec<String>,
    },

    /// Presets were declared outside the root build file.
    #[error("presets may only be declared in the root build.toml, found in {path}")]
    #[diagnostic(code(ninjatree::manifest::preset_misplaced))]
    PresetMisplaced {
        /// Path of the offending build file.
        path: Utf8PathBuf,
    },

    /// A target declaration has neither `name` nor `output`.
    #[error("a [[{table}]] entry in '{dir}' declares neither `name` nor `output`")]
    #[diagnostic(code(ninjatree::manifest::missing_name))]
    MissingNameOrOutput {
        /// Directory of the declaring build file.
        dir: Utf8PathBuf,
        /// Table the declaration appeared in.
        table: &'static str,
    },

    /// A command target has no `command`.
    #[error("command target '{name}' in '{dir}' has no `command`")]
    #[diagnostic(code(ninjatree::manifest::missing_command))]
    MissingCommand {
        /// Directory of the declaring build file.
        dir: Utf8PathBuf,
        /// Name of the command target.
        name: String,
    },
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(ninjatree::toml::parse))]
struct TomlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("error here")]
    span: Option<SourceSpan>,
    #[source]
    source: toml::de::Error,
    message: String,
}

/// Map a `toml` deserialisation error into a [`miette`] diagnostic.
///
/// The span reported by `toml` is kept so the rendered report points at the
/// offending key or value.
#[must_use]
pub fn map_toml_error(
    err: toml::de::Error,
    src: &str,
    name: &str,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let span = err
        .span()
        .map(|range| SourceSpan::new(range.start.into(), range.len()));
    let message = format!("TOML error in {name}: {}", err.message());
    Box::new(TomlDiagnostic {
        src: NamedSource::new(name, src.to_owned()),
        span,
        source: err,
        message,
    })
}
