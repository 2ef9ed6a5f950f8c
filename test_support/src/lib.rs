//! Test utilities for building throwaway source trees.
//!
//! [`BuildTree`] lays out `build.toml` files in a temporary directory so
//! integration tests can drive the generator against a real filesystem.

pub mod check_ninja;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// A temporary source root populated with build files.
///
/// The directory is removed when the value is dropped.
#[derive(Debug)]
pub struct BuildTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl BuildTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created or its
    /// path is not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create temp source root")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("temp dir {} is not UTF-8", p.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Create a tree from `(relative path, contents)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let tree = Self::new()?;
        for (rel, body) in files {
            tree.write(rel, body)?;
        }
        Ok(tree)
    }

    /// Write `body` to `rel`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parents cannot be created.
    pub fn write(&self, rel: &str, body: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, body).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Absolute path of the tree root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn files_land_under_the_root() -> Result<()> {
        let tree = BuildTree::with_files(&[("build.toml", ""), ("lib/core/build.toml", "x")])?;
        anyhow::ensure!(tree.root().join("lib/core/build.toml").is_file());
        anyhow::ensure!(fs::read_to_string(tree.root().join("lib/core/build.toml"))? == "x");
        Ok(())
    }
}
