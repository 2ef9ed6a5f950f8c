//! Ninjatree core library.
//!
//! Loads a directory tree of `build.toml` files, resolves the declared
//! targets into a build graph and renders it as a Ninja file.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use ninjatree::{ir::BuildGraph, manifest::SourceTree};
//!
//! # fn main() -> anyhow::Result<()> {
//! let tree = SourceTree::load(Utf8Path::new("."), Some("debug"))?;
//! let graph = BuildGraph::from_tree(&tree)?;
//! println!("{} steps", graph.step_count());
//! # Ok(()) }
//! ```

pub mod ast;
pub mod cli;
pub mod flags;
pub mod ir;
pub mod manifest;
pub mod ninja_gen;
pub mod runner;
pub mod target;
pub mod toolchain;
