//! Writing generated Ninja text to its destination.

use super::NinjaContent;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Whether `path` requests standard output.
pub(super) fn is_stdout_path(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Write `content` to `path`, replacing any previous file atomically.
///
/// The text goes to a temporary file in the destination directory first and
/// is renamed into place, so a failed run never leaves a truncated file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written or renamed.
pub(super) fn write_ninja_file(path: &Path, content: &NinjaContent) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(content.as_str().as_bytes())
        .and_then(|()| tmp.flush())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to write Ninja file to {}", path.display()))?;
    info!("Generated Ninja file at {}", path.display());
    Ok(())
}

/// Write `content` to standard output.
///
/// # Errors
///
/// Returns an error if standard output is closed or cannot be written.
pub(super) fn write_ninja_stdout(content: &NinjaContent) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_str().as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write Ninja file to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("-", true)]
    #[case("./-", false)]
    #[case("build.ninja", false)]
    fn dash_means_stdout(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(is_stdout_path(Path::new(raw)), expected);
    }

    #[rstest]
    fn file_is_replaced_in_place() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/build.ninja");
        write_ninja_file(&path, &NinjaContent::new("old\n".into()))?;
        write_ninja_file(&path, &NinjaContent::new("new\n".into()))?;
        anyhow::ensure!(fs::read_to_string(&path)? == "new\n");
        let leftovers = fs::read_dir(path.parent().context("parent")?)?.count();
        anyhow::ensure!(leftovers == 1, "temporary files left behind: {leftovers}");
        Ok(())
    }
}
