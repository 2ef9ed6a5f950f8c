//! CLI execution and command dispatch logic.
//!
//! Keeps `main` minimal: [`run`] resolves the directories named on the
//! command line, runs the load, resolve and render pipeline and writes the
//! result. Nothing is written unless every stage succeeds.

mod error;
mod output;

pub use error::RunnerError;

use crate::cli::{Cli, Commands};
use crate::ir::BuildGraph;
use crate::manifest::SourceTree;
use crate::ninja_gen::{self, NINJA_FILE, Settings};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::path::{self, Path};
use tracing::debug;

/// Wrapper around generated Ninja text.
#[derive(Debug, Clone)]
pub struct NinjaContent(String);
impl NinjaContent {
    /// Store the provided Ninja text.
    #[must_use]
    pub const fn new(content: String) -> Self {
        Self(content)
    }
    /// Borrow the underlying text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the build tree cannot be loaded or resolved, or if
/// the output cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Configure);
    let settings = resolve_settings(cli)?;
    let ninja = generate_ninja(&settings)?;
    match command {
        Commands::Configure => {
            let path = settings.build_root.join(NINJA_FILE);
            output::write_ninja_file(path.as_std_path(), &ninja)
        }
        Commands::Manifest { file } => {
            if output::is_stdout_path(&file) {
                output::write_ninja_stdout(&ninja)
            } else {
                output::write_ninja_file(&file, &ninja)
            }
        }
    }
}

fn utf8(path: impl Into<std::path::PathBuf>) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path.into()).map_err(|raw| RunnerError::NonUtf8Path { path: raw })
}

/// Turn the command line into absolute generation settings.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let source_root = std::fs::canonicalize(&cli.directory)
        .with_context(|| format!("cannot resolve source root {}", cli.directory.display()))?;
    let build_root = absolute(&cli.build_dir)?;
    let entry_point =
        std::env::current_exe().context("cannot determine the generator executable")?;
    Ok(Settings {
        source_root: utf8(source_root)?,
        build_root: utf8(build_root)?,
        preset: Some(cli.preset.clone()),
        toolchain: cli.toolchain.clone(),
        entry_point: utf8(entry_point)?,
    })
}

fn absolute(dir: &Path) -> Result<std::path::PathBuf> {
    path::absolute(dir).with_context(|| format!("cannot resolve build directory {}", dir.display()))
}

/// Load, resolve and render the tree described by `settings`.
///
/// # Errors
///
/// Returns an error if any build file is missing or malformed, or if the
/// targets cannot be resolved.
fn generate_ninja(settings: &Settings) -> Result<NinjaContent> {
    let tree = SourceTree::load(&settings.source_root, settings.preset.as_deref())
        .with_context(|| format!("loading build tree at {}", settings.source_root))?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        let targets_json =
            serde_json::to_string_pretty(&tree.targets).context("serialising targets")?;
        debug!("Targets:\n{targets_json}");
    }
    let graph = BuildGraph::from_tree(&tree).context("resolving build graph")?;
    debug!(steps = graph.step_count(), "resolved build graph");
    Ok(NinjaContent::new(ninja_gen::generate(&graph, settings)))
}
