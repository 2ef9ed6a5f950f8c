//! Compiler, assembler and archiver rule templates.

use clap::Args;

use crate::ir::{
    RULE_ASM, RULE_CLEAN, RULE_CUSTOM_COMMAND, RULE_CXX, RULE_LINK, RULE_LINK_STATIC, Rule,
};

/// Programs invoked by the emitted rules.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Toolchain {
    /// C++ compiler and linker driver.
    #[arg(long, value_name = "CMD", default_value = "clang++")]
    pub cxx: String,

    /// Assembler.
    #[arg(long, value_name = "CMD", default_value = "nasm")]
    pub asm: String,

    /// Static library archiver.
    #[arg(long, value_name = "CMD", default_value = "llvm-ar")]
    pub ar: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            cxx: "clang++".to_owned(),
            asm: "nasm".to_owned(),
            ar: "llvm-ar".to_owned(),
        }
    }
}

impl Toolchain {
    /// Rules referenced by target steps, in declaration order.
    #[must_use]
    pub fn rules(&self) -> Vec<Rule> {
        vec![
            Rule {
                name: RULE_CLEAN.to_owned(),
                command: "ninja -t clean".to_owned(),
                ..Rule::default()
            },
            Rule {
                name: RULE_CUSTOM_COMMAND.to_owned(),
                command: "$command".to_owned(),
                description: Some("$description".to_owned()),
                ..Rule::default()
            },
            Rule {
                name: RULE_ASM.to_owned(),
                command: format!("{} $flags -MD $out.d -MT $out -f elf64 -o $out $in", self.asm),
                description: Some("Building ASM object $out".to_owned()),
                depfile: Some("$out.d".to_owned()),
                deps_format: Some("gcc".to_owned()),
                generator: false,
            },
            Rule {
                name: RULE_CXX.to_owned(),
                command: format!("{} $flags -MD -MT $out -MF $out.d -o $out -c $in", self.cxx),
                description: Some("Building CXX object $out".to_owned()),
                depfile: Some("$out.d".to_owned()),
                deps_format: Some("gcc".to_owned()),
                generator: false,
            },
            Rule {
                name: RULE_LINK.to_owned(),
                command: format!("{} $flags $in -o $out $libs", self.cxx),
                description: Some("Linking executable $out".to_owned()),
                ..Rule::default()
            },
            Rule {
                name: RULE_LINK_STATIC.to_owned(),
                command: format!("rm -f $out && {} qcs $out $in", self.ar),
                description: Some("Linking static library $out".to_owned()),
                ..Rule::default()
            },
        ]
    }
}
