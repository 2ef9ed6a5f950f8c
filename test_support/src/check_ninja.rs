//! Validation of generated files with a real `ninja`, when one is installed.

use anyhow::{Context, Result, ensure};
use std::path::Path;
use std::process::{Command, Stdio};

/// Whether a `ninja` executable is reachable on `PATH`.
pub fn ninja_available() -> bool {
    Command::new("ninja")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

/// Ask ninja to list every target of `build_file`, failing on parse errors.
///
/// Uses `-t targets all`, which loads the file without running any rule.
///
/// # Errors
///
/// Returns an error if ninja cannot be spawned or rejects the file.
pub fn ninja_lists_targets(build_file: &Path) -> Result<String> {
    let output = Command::new("ninja")
        .arg("-f")
        .arg(build_file)
        .args(["-t", "targets", "all"])
        .output()
        .with_context(|| format!("spawn ninja for {}", build_file.display()))?;
    ensure!(
        output.status.success(),
        "ninja rejected {}: {}",
        build_file.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
