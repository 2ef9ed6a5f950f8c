//! Configuration tree loading.
//!
//! The loader starts at the source root and reads one [`BUILD_FILE`] per
//! directory. Flags flow top-down: each directory merges its own additions
//! (and, at the root, the selected preset) into the set it inherited, then
//! hands a copy to every subdirectory. Targets flow bottom-up: subdirectories
//! are walked before the directory's own declarations are built, and each
//! walk returns the targets it found instead of appending to shared state.

use crate::ast::BuildFile;
use crate::flags::FlagSet;
use crate::target::{Ambient, Target, TargetKind};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fs, io};
use tracing::{debug, info};

mod diagnostics;

pub use diagnostics::{ManifestError, map_toml_error};

/// File name read from every directory of the tree.
pub const BUILD_FILE: &str = "build.toml";

/// Everything discovered by walking the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// Targets in declaration order, ending with the synthetic `all` goal.
    pub targets: Vec<Target>,
    /// Every build file visited, relative to the source root, in visit order.
    pub build_files: Vec<Utf8PathBuf>,
}

impl SourceTree {
    /// Walk the tree rooted at `source_root`.
    ///
    /// `preset` selects one of the presets declared by the root build file;
    /// `None` applies no preset.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] for the first missing or malformed build
    /// file, preset problem, or invalid target declaration.
    pub fn load(source_root: &Utf8Path, preset: Option<&str>) -> Result<Self, ManifestError> {
        let walker = TreeWalker {
            source_root,
            preset,
        };
        let mut tree = walker.walk(Utf8Path::new(""), &FlagSet::default())?;
        let all = Target::aggregate(&tree.targets);
        tree.targets.push(all);
        Ok(tree)
    }

    fn extend(&mut self, other: Self) {
        self.targets.extend(other.targets);
        self.build_files.extend(other.build_files);
    }
}

struct TreeWalker<'a> {
    source_root: &'a Utf8Path,
    preset: Option<&'a str>,
}

impl TreeWalker<'_> {
    fn walk(&self, dir: &Utf8Path, inherited: &FlagSet) -> Result<SourceTree, ManifestError> {
        let build_file = dir.join(BUILD_FILE);
        info!("Building {build_file}");
        let file = from_path(&self.source_root.join(&build_file))?;

        let mut flags = inherited.merge(&file.flags);
        if !file.presets.is_empty() {
            if !dir.as_str().is_empty() {
                return Err(ManifestError::PresetMisplaced { path: build_file });
            }
            if let Some(name) = self.preset {
                let preset =
                    file.presets
                        .get(name)
                        .ok_or_else(|| ManifestError::UnknownPreset {
                            preset: name.to_owned(),
                            available: file.presets.keys().cloned().collect(),
                        })?;
                debug!(preset = name, "applying preset");
                flags = flags.merge(preset);
            }
        }

        let mut tree = SourceTree {
            targets: Vec::new(),
            build_files: vec![build_file],
        };
        for subdir in &file.subdirs {
            tree.extend(self.walk(&dir.join(subdir), &flags)?);
        }

        let ambient = Ambient {
            dir,
            flags: &flags,
            sources: &file.sources,
        };
        let tables = [
            (&file.command, Some(TargetKind::Command)),
            (&file.executable, Some(TargetKind::Executable)),
            (&file.library, None),
            (&file.phony, Some(TargetKind::Phony)),
        ];
        for (decls, kind) in tables {
            for decl in decls {
                tree.targets.push(Target::from_decl(decl, ambient, kind)?);
            }
        }
        Ok(tree)
    }
}

/// Parse a build file from a string; `name` labels diagnostics.
///
/// # Errors
///
/// Returns [`ManifestError::ConfigParse`] when the TOML is malformed or does
/// not match the [`BuildFile`] schema.
pub fn from_str_named(src: &str, name: &Utf8Path) -> Result<BuildFile, ManifestError> {
    toml::from_str(src).map_err(|e| ManifestError::ConfigParse {
        path: name.to_owned(),
        source: map_toml_error(e, src, name.as_str()),
    })
}

/// Load a single [`BuildFile`] from `path`.
///
/// # Errors
///
/// Returns [`ManifestError::ConfigNotFound`] when the file is absent,
/// [`ManifestError::ConfigRead`] for other I/O failures and
/// [`ManifestError::ConfigParse`] when parsing fails.
pub fn from_path(path: &Utf8Path) -> Result<BuildFile, ManifestError> {
    let data = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ManifestError::ConfigNotFound {
                path: path.to_owned(),
            }
        } else {
            ManifestError::ConfigRead {
                path: path.to_owned(),
                source,
            }
        }
    })?;
    from_str_named(&data, path)
}
