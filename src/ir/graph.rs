//! Build graph data structures and the writer seam they are emitted through.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. FIXME: remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

/// Rule compiling assembler sources.
pub const RULE_ASM: &str = "asm";
/// Rule compiling C++ sources.
pub const RULE_CXX: &str = "cxx";
/// Rule linking an executable.
pub const RULE_LINK: &str = "link";
/// Rule archiving a static library.
pub const RULE_LINK_STATIC: &str = "link-static";
/// Rule running an opaque shell command.
pub const RULE_CUSTOM_COMMAND: &str = "custom_command";
/// Ninja's built-in alias rule.
pub const RULE_PHONY: &str = "phony";
/// Rule removing build outputs.
pub const RULE_CLEAN: &str = "clean";
/// Rule regenerating the build description.
pub const RULE_CONFIGURE: &str = "configure";
/// Pool allowing a single step at a time with terminal access.
pub const CONSOLE_POOL: &str = "console";

/// A named command template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    /// Name steps refer to.
    pub name: String,
    /// Command line; may reference `$in`, `$out` and step variables.
    pub command: String,
    /// Human-readable progress line.
    pub description: Option<String>,
    /// Dependency file written by the command.
    pub depfile: Option<String>,
    /// Format of `depfile`, such as `gcc`.
    pub deps_format: Option<String>,
    /// Marks the rule as regenerating the build description itself.
    pub generator: bool,
}

/// An input path named by a build step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepPath {
    /// Relative to the build directory, where Ninja runs.
    Build(Utf8PathBuf),
    /// Relative to the source root; writers place it under `$root`.
    Source(Utf8PathBuf),
}

impl From<Utf8PathBuf> for StepPath {
    fn from(path: Utf8PathBuf) -> Self {
        Self::Build(path)
    }
}

impl From<&str> for StepPath {
    fn from(path: &str) -> Self {
        Self::Build(Utf8PathBuf::from(path))
    }
}

/// One build statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStep {
    /// Files produced by the step.
    pub outputs: Vec<Utf8PathBuf>,
    /// Name of the [`Rule`] (or `phony`) producing the outputs.
    pub rule: String,
    /// Inputs passed to the command as `$in`.
    pub inputs: Vec<StepPath>,
    /// Inputs that must be up to date but are not on the command line.
    pub implicit: Vec<StepPath>,
    /// Inputs that only constrain ordering.
    pub order_only: Vec<StepPath>,
    /// Step-scoped variable bindings, in emission order.
    pub variables: IndexMap<String, String>,
    /// Exclusive resource pool, if any.
    pub pool: Option<String>,
}

impl BuildStep {
    /// A step producing `output` with `rule`.
    #[must_use]
    pub fn new(output: impl Into<Utf8PathBuf>, rule: &str) -> Self {
        Self {
            outputs: vec![output.into()],
            rule: rule.to_owned(),
            ..Self::default()
        }
    }

    /// Bind a step variable.
    #[must_use]
    pub fn with_variable(mut self, key: &str, value: impl Into<String>) -> Self {
        self.variables.insert(key.to_owned(), value.into());
        self
    }
}

/// Steps emitted for one target, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSteps {
    /// Target name, used as the block heading.
    pub name: String,
    /// Compile steps followed by the target's own step(s).
    pub steps: Vec<BuildStep>,
}

/// The resolved graph of every target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildGraph {
    /// Per-target steps in collection order.
    pub targets: Vec<TargetSteps>,
    /// Build files the description depends on, relative to the source root.
    pub build_files: Vec<Utf8PathBuf>,
    /// Goal built when none is requested.
    pub default_target: Utf8PathBuf,
}

/// Sink for build description statements.
///
/// The graph emitter only produces statements; implementations decide how
/// they are rendered and where they go.
pub trait DescriptionWriter {
    /// Emit a comment line.
    fn comment(&mut self, text: &str);
    /// Emit a top-level variable binding.
    fn variable(&mut self, key: &str, value: &str);
    /// Declare a rule.
    fn rule(&mut self, rule: &Rule);
    /// Declare a build step.
    fn build(&mut self, step: &BuildStep);
    /// Declare the default goals.
    fn default(&mut self, targets: &[Utf8PathBuf]);
    /// Emit a blank separator line.
    fn newline(&mut self);
}

/// Errors raised while resolving targets into build steps.
#[derive(Debug, Error, Diagnostic)]
pub enum IrGenError {
    /// A dependency names no known target.
    #[error("target '{target}' depends on unknown target '{dependency}'")]
    #[diagnostic(code(ninjatree::ir::unknown_dependency))]
    UnknownDependency {
        /// Target declaring the dependency.
        target: String,
        /// The unresolved name.
        dependency: String,
    },

    /// A source file has an extension no rule compiles.
    #[error("target '{target}' has source '{source_path}' with an unsupported extension")]
    #[diagnostic(
        code(ninjatree::ir::unsupported_source),
        help("sources must end in .asm or .cc")
    )]
    UnsupportedSourceExtension {
        /// Target owning the source.
        target: String,
        /// Offending source path relative to the source root.
        source_path: Utf8PathBuf,
    },

    /// Two declarations share a name.
    #[error("target '{name}' is declared in both '{first}' and '{second}'")]
    #[diagnostic(code(ninjatree::ir::duplicate_target))]
    DuplicateTarget {
        /// Duplicated name.
        name: String,
        /// Directory of the first declaration.
        first: Utf8PathBuf,
        /// Directory of the later declaration.
        second: Utf8PathBuf,
    },

    /// Dependencies form a cycle.
    #[error("circular dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(code(ninjatree::ir::circular_dependency))]
    CircularDependency {
        /// Target names along the cycle, starting and ending with the same name.
        cycle: Vec<String>,
    },
}
