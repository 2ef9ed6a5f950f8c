//! Per-stage compilation flags.
//!
//! A [`FlagSet`] maps each toolchain [`Stage`] to the flag string accumulated
//! so far. Flag sets are values: merging returns a new set, so a copy handed
//! to one subdirectory never leaks additions into its siblings.
//!
//! ```
//! use ninjatree::flags::{FlagSet, Stage, StageFlags};
//!
//! let root = FlagSet::default().merge(&StageFlags::cxx("-Wall"));
//! let child = root.merge(&StageFlags::cxx("-O2"));
//! assert_eq!(child.get(Stage::Cxx).trim(), "-Wall -O2");
//! assert_eq!(root.get(Stage::Cxx).trim(), "-Wall");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Toolchain stage a flag string applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Assembler flags (`asm_flags`).
    Asm,
    /// Compiler flags (`cxx_flags`).
    Cxx,
    /// Linker flags (`ld_flags`).
    Ld,
}

impl Stage {
    /// Every stage, in emission order.
    pub const ALL: [Self; 3] = [Self::Asm, Self::Cxx, Self::Ld];

    /// Name of the Ninja rule compiling sources for this stage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asm => "asm",
            Self::Cxx => "cxx",
            Self::Ld => "ld",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flag additions declared by a single `build.toml` table.
///
/// Absent keys leave the inherited value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StageFlags {
    /// Additional assembler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asm_flags: Option<String>,
    /// Additional compiler flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cxx_flags: Option<String>,
    /// Additional linker flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ld_flags: Option<String>,
}

impl StageFlags {
    /// Additions touching only the compiler stage.
    #[must_use]
    pub fn cxx(flags: impl Into<String>) -> Self {
        Self {
            cxx_flags: Some(flags.into()),
            ..Self::default()
        }
    }

    /// Borrow the addition declared for `stage`, if any.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Asm => self.asm_flags.as_deref(),
            Stage::Cxx => self.cxx_flags.as_deref(),
            Stage::Ld => self.ld_flags.as_deref(),
        }
    }
}

/// Accumulated flags for every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagSet {
    asm: String,
    cxx: String,
    ld: String,
}

impl FlagSet {
    /// A flag set with every stage empty.
    ///
    /// Used by targets declaring `no_inherit` before their own additions are
    /// applied.
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            asm: String::new(),
            cxx: String::new(),
            ld: String::new(),
        }
    }

    /// Return a new set with `local` appended to each stage it declares.
    ///
    /// Additions are separated by a single space; the raw result may carry
    /// leading whitespace, which emission trims.
    #[must_use]
    pub fn merge(&self, local: &StageFlags) -> Self {
        let mut merged = self.clone();
        for stage in Stage::ALL {
            if let Some(extra) = local.get(stage) {
                let slot = merged.slot_mut(stage);
                slot.push(' ');
                slot.push_str(extra);
            }
        }
        merged
    }

    /// Raw accumulated flags for `stage`.
    #[must_use]
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::Asm => &self.asm,
            Stage::Cxx => &self.cxx,
            Stage::Ld => &self.ld,
        }
    }

    const fn slot_mut(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::Asm => &mut self.asm,
            Stage::Cxx => &mut self.cxx,
            Stage::Ld => &mut self.ld,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn merge_appends_with_space() {
        let parent = FlagSet::default().merge(&StageFlags::cxx("-Wall"));
        let merged = parent.merge(&StageFlags::cxx("-O2"));
        assert_eq!(merged.get(Stage::Cxx), " -Wall -O2");
    }

    #[rstest]
    fn merge_leaves_parent_untouched() {
        let parent = FlagSet::default().merge(&StageFlags::cxx("-Wall"));
        let _child = parent.merge(&StageFlags::cxx("-DCHILD"));
        assert_eq!(parent.get(Stage::Cxx), " -Wall");
    }

    #[rstest]
    fn absent_stages_are_not_padded() {
        let merged = FlagSet::default().merge(&StageFlags {
            ld_flags: Some("-static".into()),
            ..StageFlags::default()
        });
        assert_eq!(merged.get(Stage::Asm), "");
        assert_eq!(merged.get(Stage::Cxx), "");
        assert_eq!(merged.get(Stage::Ld), " -static");
    }

    #[rstest]
    fn reset_discards_every_stage() {
        let inherited = FlagSet::default().merge(&StageFlags {
            asm_flags: Some("-g".into()),
            cxx_flags: Some("-O2".into()),
            ld_flags: Some("-s".into()),
        });
        assert_ne!(inherited, FlagSet::reset());
        assert!(Stage::ALL.iter().all(|s| FlagSet::reset().get(*s).is_empty()));
    }

    #[rstest]
    #[case(Stage::Asm, "asm")]
    #[case(Stage::Cxx, "cxx")]
    #[case(Stage::Ld, "ld")]
    fn stage_names(#[case] stage: Stage, #[case] name: &str) {
        assert_eq!(stage.to_string(), name);
    }
}
