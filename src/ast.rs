//! `build.toml` syntax tree.
//!
//! These structures mirror the keys accepted in a directory's `build.toml`
//! and are deserialised with the `toml` crate. They carry declarations as
//! written; [`crate::target`] turns them into resolved targets.
//!
//! ```rust
//! use ninjatree::ast::BuildFile;
//!
//! let src = r#"
//! cxx_flags = "-Wall"
//! subdirs = ["lib"]
//!
//! [[executable]]
//! name = "app"
//! sources = ["main.cc"]
//! deps = ["core"]
//! "#;
//! let file: BuildFile = toml::from_str(src).expect("parse");
//! assert_eq!(file.subdirs, vec!["lib".to_owned()]);
//! assert_eq!(file.executable.len(), 1);
//! ```

use crate::flags::StageFlags;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Contents of a single `build.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BuildFile {
    /// Flags added for every target declared here or below.
    #[serde(flatten)]
    pub flags: StageFlags,

    /// Subdirectories to load, in order.
    #[serde(default)]
    pub subdirs: Vec<String>,

    /// Sources prepended to every executable and library declared here.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Named flag overrides; only valid in the root `build.toml`.
    #[serde(default, rename = "preset")]
    pub presets: IndexMap<String, StageFlags>,

    /// Custom command targets.
    #[serde(default)]
    pub command: Vec<TargetDecl>,

    /// Executable targets.
    #[serde(default)]
    pub executable: Vec<TargetDecl>,

    /// Static or object libraries.
    #[serde(default)]
    pub library: Vec<TargetDecl>,

    /// Phony targets.
    #[serde(default)]
    pub phony: Vec<TargetDecl>,
}

/// Library flavour selected by a library's `type` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryType {
    /// Archived into `lib<name>.a`.
    #[default]
    Static,
    /// Compiled objects handed directly to each consumer.
    Object,
}

/// One target declaration as written.
///
/// The same shape serves every target table; keys that do not apply to a
/// kind are ignored by the builder.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TargetDecl {
    /// Target name; falls back to `output` when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Output name used when `name` is absent.
    #[serde(default)]
    pub output: Option<String>,
    /// Library flavour, only read for `[[library]]` tables.
    #[serde(default, rename = "type")]
    pub library_type: LibraryType,
    /// Names of targets this one depends on.
    #[serde(default)]
    pub deps: Vec<String>,
    /// Target-specific sources, appended after the directory defaults.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Single shell command of a `[[command]]` target.
    #[serde(default)]
    pub command: Option<String>,
    /// Shell commands of a `[[phony]]` target.
    #[serde(default)]
    pub commands: Vec<String>,
    /// Discard inherited flags before applying this declaration's own.
    #[serde(default)]
    pub no_inherit: bool,
    /// Run this target's steps in the exclusive console pool.
    #[serde(default)]
    pub uses_console: bool,
    /// Flag additions local to this target.
    #[serde(flatten)]
    pub flags: StageFlags,
}
