//! Intermediate representation of the emitted build description.
//!
//! [`BuildGraph::from_tree`] validates the loaded targets and resolves each
//! one into [`BuildStep`]s. The graph knows nothing about Ninja syntax;
//! [`BuildGraph::emit`] replays it through any [`DescriptionWriter`].
//!
//! # Examples
//!
//! ```
//! use ninjatree::ir::{BuildGraph, TargetSteps, BuildStep};
//!
//! let mut graph = BuildGraph::default();
//! graph.targets.push(TargetSteps {
//!     name: "hello".into(),
//!     steps: vec![BuildStep::new("hello", "phony")],
//! });
//! assert_eq!(graph.step_count(), 1);
//! ```

mod cycle;
mod from_tree;
mod graph;

pub use graph::{
    BuildGraph, BuildStep, CONSOLE_POOL, DescriptionWriter, IrGenError, RULE_ASM, RULE_CLEAN,
    RULE_CONFIGURE, RULE_CUSTOM_COMMAND, RULE_CXX, RULE_LINK, RULE_LINK_STATIC, RULE_PHONY, Rule,
    StepPath, TargetSteps,
};

impl BuildGraph {
    /// Total number of build steps across all targets.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.targets.iter().map(|t| t.steps.len()).sum()
    }

    /// Write every target's steps, each block headed by the target name.
    pub fn emit(&self, writer: &mut impl DescriptionWriter) {
        for target in &self.targets {
            writer.comment(&target.name);
            for step in &target.steps {
                writer.build(step);
                writer.newline();
            }
        }
    }
}
