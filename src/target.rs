//! Resolved build targets.
//!
//! [`Target`] is the normalised form of a declaration, independent of the
//! `build.toml` table it came from. [`Target::from_decl`] applies naming,
//! output and flag inheritance rules; it performs no lookups across targets.

use crate::ast::{LibraryType, TargetDecl};
use crate::flags::FlagSet;
use crate::manifest::ManifestError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Name of the synthetic default goal.
pub const ALL_TARGET: &str = "all";

/// The kind of artefact a target produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Logical alias, optionally running commands.
    Phony,
    /// A single shell command producing `output`.
    Command,
    /// Linked executable.
    Executable,
    /// Archive named `lib<name>.a`.
    StaticLibrary,
    /// Compiled objects expanded into each consumer.
    ObjectLibrary,
}

impl TargetKind {
    /// Whether sources declared on this kind are compiled.
    #[must_use]
    pub const fn compiles_sources(self) -> bool {
        matches!(
            self,
            Self::Executable | Self::StaticLibrary | Self::ObjectLibrary
        )
    }

    /// Which `build.toml` table declares this kind.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Phony => "phony",
            Self::Command => "command",
            Self::Executable => "executable",
            Self::StaticLibrary | Self::ObjectLibrary => "library",
        }
    }
}

/// Directory-level context a declaration is built against.
#[derive(Debug, Clone, Copy)]
pub struct Ambient<'a> {
    /// Directory of the declaring `build.toml`, relative to the source root.
    pub dir: &'a Utf8Path,
    /// Fully merged flags of that directory.
    pub flags: &'a FlagSet,
    /// Directory default sources.
    pub sources: &'a [String],
}

/// A fully constructed build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Identifier referenced from other targets' `deps`.
    pub name: String,
    /// What the target produces.
    pub kind: TargetKind,
    /// Declaring directory relative to the source root.
    pub dir: Utf8PathBuf,
    /// Artefact path, or the logical alias for phony-like kinds.
    pub output: Utf8PathBuf,
    /// Declared dependency names, unresolved.
    pub deps: Vec<String>,
    /// Sources relative to `dir`; directory defaults first.
    pub sources: Vec<String>,
    /// Effective flags after inheritance and local additions.
    pub flags: FlagSet,
    /// Whether steps must run in the exclusive console pool.
    pub uses_console: bool,
    /// Shell commands for command and phony targets.
    pub commands: Vec<String>,
}

impl Target {
    /// Build a target from its declaration.
    ///
    /// `kind_override` is `None` for `[[library]]` tables, whose kind comes from the
    /// declaration's `type` key. Command and phony targets ignore the
    /// ambient flags and default sources.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::MissingNameOrOutput`] when neither `name` nor
    /// `output` is declared and [`ManifestError::MissingCommand`] when a
    /// command target lacks its `command`.
    pub fn from_decl(
        decl: &TargetDecl,
        ambient: Ambient<'_>,
        kind_override: Option<TargetKind>,
    ) -> Result<Self, ManifestError> {
        let kind = kind_override.unwrap_or(match decl.library_type {
            LibraryType::Static => TargetKind::StaticLibrary,
            LibraryType::Object => TargetKind::ObjectLibrary,
        });

        let name = decl
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| decl.output.as_deref().filter(|o| !o.is_empty()))
            .map(str::to_owned)
            .ok_or_else(|| ManifestError::MissingNameOrOutput {
                dir: ambient.dir.to_owned(),
                table: kind.table(),
            })?;

        let output = match kind {
            TargetKind::StaticLibrary => ambient.dir.join(format!("lib{name}.a")),
            _ => ambient.dir.join(&name),
        };

        let commands = match kind {
            TargetKind::Command => {
                let command =
                    decl.command
                        .clone()
                        .ok_or_else(|| ManifestError::MissingCommand {
                            dir: ambient.dir.to_owned(),
                            name: name.clone(),
                        })?;
                vec![command]
            }
            TargetKind::Phony => decl.commands.clone(),
            _ => Vec::new(),
        };

        let (base_flags, sources) = if kind.compiles_sources() {
            let mut sources = ambient.sources.to_vec();
            sources.extend(decl.sources.iter().cloned());
            (ambient.flags.clone(), sources)
        } else {
            (FlagSet::default(), Vec::new())
        };
        let inherited = if decl.no_inherit {
            FlagSet::reset()
        } else {
            base_flags
        };

        Ok(Self {
            name,
            kind,
            dir: ambient.dir.to_owned(),
            output,
            deps: decl.deps.clone(),
            sources,
            flags: inherited.merge(&decl.flags),
            uses_console: decl.uses_console,
            commands,
        })
    }

    /// The synthetic `all` goal depending on every buildable target.
    ///
    /// Phony and object library targets are left out: neither produces an
    /// artefact worth building by default.
    #[must_use]
    pub fn aggregate(targets: &[Self]) -> Self {
        let deps = targets
            .iter()
            .filter(|t| !matches!(t.kind, TargetKind::Phony | TargetKind::ObjectLibrary))
            .map(|t| t.name.clone())
            .collect();
        Self {
            name: ALL_TARGET.to_owned(),
            kind: TargetKind::Phony,
            dir: Utf8PathBuf::new(),
            output: Utf8PathBuf::from(ALL_TARGET),
            deps,
            sources: Vec::new(),
            flags: FlagSet::default(),
            uses_console: false,
            commands: Vec::new(),
        }
    }

    /// Path of the object compiled from `source` for this target.
    ///
    /// Depends only on the target's directory, name and the source path, so
    /// repeated runs over the same tree agree.
    #[must_use]
    pub fn object_path(&self, source: &str) -> Utf8PathBuf {
        self.dir
            .join(format!("{}-objs", self.name))
            .join(format!("{source}.o"))
    }
}
