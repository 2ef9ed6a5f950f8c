//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. The
//! options double as the generator's configuration: the emitted
//! reconfigure step re-invokes the binary with the same values.

use crate::toolchain::Toolchain;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Compile a tree of `build.toml` files into a Ninja build file.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source root holding the top-level build.toml.
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Build directory receiving build.ninja and all outputs.
    #[arg(short = 'B', long = "build-dir", value_name = "DIR", default_value = "build")]
    pub build_dir: PathBuf,

    /// Preset declared by the root build.toml to apply.
    #[arg(short, long, value_name = "NAME", default_value = "debug")]
    pub preset: String,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Toolchain programs used by the emitted rules.
    #[command(flatten)]
    pub toolchain: Toolchain,

    /// Optional subcommand to execute; defaults to `configure` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Write `build.ninja` into the build directory (the default).
    Configure,

    /// Write the Ninja file to the given path without touching the build directory.
    Manifest {
        /// Output path for the generated Ninja file; `-` writes to stdout.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}
