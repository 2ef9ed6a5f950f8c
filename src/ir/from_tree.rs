//! Target-to-step resolution.
//!
//! Each target contributes one compile step per source plus the step(s)
//! producing the target itself. Dependencies are split three ways:
//!
//! - object libraries add their compiled objects as explicit inputs and
//!   their alias as an order-only input;
//! - every other dependency adds its output as an implicit input;
//! - a source whose path equals another target's output is read from the
//!   build directory instead of the source tree.
//!
//! Paths stay plain here; quoting and the `$root` prefix belong to the writer.

use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;

use crate::flags::Stage;
use crate::manifest::SourceTree;
use crate::target::{ALL_TARGET, Target, TargetKind};

use super::{
    cycle,
    graph::{
        BuildGraph, BuildStep, CONSOLE_POOL, IrGenError, RULE_CUSTOM_COMMAND, RULE_LINK,
        RULE_LINK_STATIC, RULE_PHONY, StepPath, TargetSteps,
    },
};

impl BuildGraph {
    /// Resolve every target of `tree` into build steps.
    ///
    /// All targets are validated and planned before anything is returned, so
    /// an error never leaves a partially resolved graph behind.
    ///
    /// # Errors
    ///
    /// Returns [`IrGenError`] when a name is declared twice, a dependency is
    /// unknown or cyclic, or a source has an unsupported extension.
    pub fn from_tree(tree: &SourceTree) -> Result<Self, IrGenError> {
        let by_name = cycle::index(&tree.targets)?;
        cycle::detect(&tree.targets, &by_name)?;

        let resolver = Resolver {
            by_name,
            outputs: tree.targets.iter().map(|t| t.output.as_path()).collect(),
        };
        let targets = tree
            .targets
            .iter()
            .map(|t| resolver.plan(t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            targets,
            build_files: tree.build_files.clone(),
            default_target: Utf8PathBuf::from(ALL_TARGET),
        })
    }
}

/// Inputs gathered for a target's own step.
#[derive(Debug, Default)]
struct Inputs {
    explicit: Vec<StepPath>,
    implicit: Vec<StepPath>,
    order_only: Vec<StepPath>,
}

impl Inputs {
    fn all(&self) -> Vec<StepPath> {
        self.explicit
            .iter()
            .chain(&self.implicit)
            .chain(&self.order_only)
            .cloned()
            .collect()
    }

    fn apply(self, mut step: BuildStep) -> BuildStep {
        step.inputs = self.explicit;
        step.implicit = self.implicit;
        step.order_only = self.order_only;
        step
    }
}

struct Resolver<'a> {
    by_name: HashMap<&'a str, &'a Target>,
    outputs: HashSet<&'a Utf8Path>,
}

impl<'a> Resolver<'a> {
    /// Resolve declared dependency names, each at most once, in declared order.
    fn dependencies(&self, target: &'a Target) -> Result<Vec<&'a Target>, IrGenError> {
        target
            .deps
            .iter()
            .unique()
            .map(|name| {
                self.by_name.get(name.as_str()).copied().ok_or_else(|| {
                    IrGenError::UnknownDependency {
                        target: target.name.clone(),
                        dependency: name.clone(),
                    }
                })
            })
            .collect()
    }

    fn plan(&self, target: &'a Target) -> Result<TargetSteps, IrGenError> {
        let deps = self.dependencies(target)?;
        let mut inputs = Inputs::default();
        for dep in &deps {
            if dep.kind == TargetKind::ObjectLibrary {
                inputs.order_only.push(StepPath::Build(dep.output.clone()));
                inputs.explicit.extend(
                    dep.sources
                        .iter()
                        .map(|s| StepPath::Build(dep.object_path(s))),
                );
            } else {
                inputs.implicit.push(StepPath::Build(dep.output.clone()));
            }
        }

        let mut steps = Vec::with_capacity(target.sources.len() + 2);
        for source in &target.sources {
            let step = self.compile_step(target, source)?;
            inputs
                .explicit
                .extend(step.outputs.iter().cloned().map(StepPath::Build));
            steps.push(step);
        }

        steps.extend(Self::target_steps(target, &deps, inputs));
        Ok(TargetSteps {
            name: target.name.clone(),
            steps,
        })
    }

    fn compile_step(&self, target: &Target, source: &str) -> Result<BuildStep, IrGenError> {
        let source_path = target.dir.join(source);
        let matched = match source_path.extension() {
            Some("asm") => Some(Stage::Asm),
            Some("cc") => Some(Stage::Cxx),
            _ => None,
        };
        let Some(stage) = matched else {
            return Err(IrGenError::UnsupportedSourceExtension {
                target: target.name.clone(),
                source_path,
            });
        };

        let input = if self.outputs.contains(source_path.as_path()) {
            StepPath::Build(source_path)
        } else {
            StepPath::Source(source_path)
        };
        let mut step = BuildStep::new(target.object_path(source), stage.as_str());
        step.inputs.push(input);
        let flags = target.flags.get(stage).trim();
        if !flags.is_empty() {
            step.variables.insert("flags".to_owned(), flags.to_owned());
        }
        Ok(step)
    }

    fn target_steps(target: &Target, deps: &[&Target], mut inputs: Inputs) -> Vec<BuildStep> {
        let pool = target.uses_console.then(|| CONSOLE_POOL.to_owned());
        match target.kind {
            TargetKind::Phony if !target.commands.is_empty() => {
                let run_output = Utf8PathBuf::from(format!("{}_commands", target.name));
                let mut run = BuildStep::new(run_output.clone(), RULE_CUSTOM_COMMAND)
                    .with_variable("command", target.commands.join(" && "))
                    .with_variable(
                        "description",
                        format!("Commands for phony target {}", target.name),
                    );
                run.order_only = inputs.all();
                run.pool = pool;
                inputs.explicit.push(StepPath::Build(run_output));
                let alias = inputs.apply(BuildStep::new(target.output.clone(), RULE_PHONY));
                vec![run, alias]
            }
            TargetKind::Phony | TargetKind::ObjectLibrary => {
                vec![inputs.apply(BuildStep::new(target.output.clone(), RULE_PHONY))]
            }
            TargetKind::Command => {
                let command = target.commands.first().cloned().unwrap_or_default();
                let mut step = inputs.apply(
                    BuildStep::new(target.output.clone(), RULE_CUSTOM_COMMAND)
                        .with_variable("command", command)
                        .with_variable("description", format!("Building {}", target.output)),
                );
                step.pool = pool;
                vec![step]
            }
            TargetKind::Executable => {
                let mut step = BuildStep::new(target.output.clone(), RULE_LINK);
                let flags = [Stage::Cxx, Stage::Ld]
                    .into_iter()
                    .map(|stage| target.flags.get(stage).trim())
                    .filter(|part| !part.is_empty())
                    .join(" ");
                if !flags.is_empty() {
                    step.variables.insert("flags".to_owned(), flags);
                }
                let libs = deps
                    .iter()
                    .filter(|d| d.kind == TargetKind::StaticLibrary)
                    .map(|d| d.output.as_str())
                    .join(" ");
                if !libs.is_empty() {
                    step.variables.insert("libs".to_owned(), libs);
                }
                step.pool = pool;
                vec![inputs.apply(step)]
            }
            TargetKind::StaticLibrary => {
                let mut step =
                    inputs.apply(BuildStep::new(target.output.clone(), RULE_LINK_STATIC));
                step.pool = pool;
                vec![step]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagSet, StageFlags};
    use crate::ir::{RULE_ASM, RULE_CXX};
    use rstest::rstest;

    fn target(name: &str, kind: TargetKind) -> Target {
        let output = match kind {
            TargetKind::StaticLibrary => Utf8PathBuf::from(format!("lib{name}.a")),
            _ => Utf8PathBuf::from(name),
        };
        Target {
            name: name.to_owned(),
            kind,
            dir: Utf8PathBuf::new(),
            output,
            deps: Vec::new(),
            sources: Vec::new(),
            flags: FlagSet::default(),
            uses_console: false,
            commands: Vec::new(),
        }
    }

    fn with_sources(mut t: Target, sources: &[&str]) -> Target {
        t.sources = sources.iter().map(|s| (*s).to_owned()).collect();
        t
    }

    fn with_deps(mut t: Target, deps: &[&str]) -> Target {
        t.deps = deps.iter().map(|s| (*s).to_owned()).collect();
        t
    }

    fn graph(targets: Vec<Target>) -> BuildGraph {
        BuildGraph::from_tree(&SourceTree {
            targets,
            build_files: Vec::new(),
        })
        .expect("graph")
    }

    fn steps<'g>(graph: &'g BuildGraph, name: &str) -> &'g [BuildStep] {
        graph
            .targets
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.steps.as_slice())
            .expect("target steps")
    }

    fn paths(items: &[&str]) -> Vec<StepPath> {
        items.iter().map(|p| StepPath::from(*p)).collect()
    }

    #[rstest]
    fn object_library_expands_into_consumer() {
        let g = graph(vec![
            with_sources(target("core", TargetKind::ObjectLibrary), &["a.cc", "b.cc"]),
            with_deps(
                with_sources(target("app", TargetKind::Executable), &["main.cc"]),
                &["core"],
            ),
        ]);
        let app = steps(&g, "app");
        assert_eq!(app.len(), 2, "one compile step plus the link step");
        let link = app.last().expect("link");
        assert_eq!(link.rule, RULE_LINK);
        assert_eq!(
            link.inputs,
            paths(&["core-objs/a.cc.o", "core-objs/b.cc.o", "app-objs/main.cc.o"])
        );
        assert_eq!(link.order_only, paths(&["core"]));
        assert!(link.implicit.is_empty());
        assert!(!link.variables.contains_key("libs"));
    }

    #[rstest]
    fn object_library_is_a_phony_alias_over_its_objects() {
        let g = graph(vec![with_sources(
            target("core", TargetKind::ObjectLibrary),
            &["a.cc"],
        )]);
        let core = steps(&g, "core");
        let alias = core.last().expect("alias");
        assert_eq!(alias.rule, RULE_PHONY);
        assert_eq!(alias.inputs, paths(&["core-objs/a.cc.o"]));
        assert!(core.iter().all(|s| s.rule != RULE_LINK_STATIC));
    }

    #[rstest]
    fn repeated_dependency_expands_once() {
        let g = graph(vec![
            with_sources(target("core", TargetKind::ObjectLibrary), &["a.cc"]),
            with_deps(target("app", TargetKind::Executable), &["core", "core"]),
        ]);
        let link = steps(&g, "app").last().expect("link").clone();
        assert_eq!(link.inputs, paths(&["core-objs/a.cc.o"]));
        assert_eq!(link.order_only, paths(&["core"]));
    }

    #[rstest]
    fn static_library_archives_only_its_own_objects() {
        let g = graph(vec![
            with_sources(target("base", TargetKind::StaticLibrary), &["base.cc"]),
            with_deps(
                with_sources(target("util", TargetKind::StaticLibrary), &["util.cc"]),
                &["base"],
            ),
        ]);
        let archive = steps(&g, "util").last().expect("archive").clone();
        assert_eq!(archive.rule, RULE_LINK_STATIC);
        assert_eq!(archive.inputs, paths(&["util-objs/util.cc.o"]));
        assert_eq!(archive.implicit, paths(&["libbase.a"]));
    }

    #[rstest]
    fn static_library_absorbs_object_library_members() {
        let g = graph(vec![
            with_sources(target("core", TargetKind::ObjectLibrary), &["a.cc"]),
            with_deps(
                with_sources(target("util", TargetKind::StaticLibrary), &["util.cc"]),
                &["core"],
            ),
        ]);
        let archive = steps(&g, "util").last().expect("archive").clone();
        assert_eq!(
            archive.inputs,
            paths(&["core-objs/a.cc.o", "util-objs/util.cc.o"])
        );
        assert_eq!(archive.order_only, paths(&["core"]));
    }

    #[rstest]
    fn executable_links_direct_static_libraries() {
        let mut app = with_deps(
            with_sources(target("app", TargetKind::Executable), &["main.cc"]),
            &["util", "gen"],
        );
        app.flags = FlagSet::default()
            .merge(&StageFlags::cxx("-O2"))
            .merge(&StageFlags {
                ld_flags: Some("-static".into()),
                ..StageFlags::default()
            });
        let mut generator = target("gen", TargetKind::Command);
        generator.commands = vec!["true".into()];
        let g = graph(vec![
            with_sources(target("util", TargetKind::StaticLibrary), &["u.cc"]),
            generator,
            app,
        ]);
        let link = steps(&g, "app").last().expect("link").clone();
        assert_eq!(link.implicit, paths(&["libutil.a", "gen"]));
        assert_eq!(link.variables.get("libs").map(String::as_str), Some("libutil.a"));
        assert_eq!(
            link.variables.get("flags").map(String::as_str),
            Some("-O2 -static")
        );
    }

    #[rstest]
    fn phony_commands_run_in_a_separate_step() {
        let mut run = with_deps(target("run", TargetKind::Phony), &["app"]);
        run.commands = vec!["a".into(), "b".into()];
        run.uses_console = true;
        let g = graph(vec![target("app", TargetKind::Executable), run]);
        let run_steps = steps(&g, "run");
        let [cmd, alias] = run_steps else {
            panic!("expected two steps, got {run_steps:?}");
        };
        assert_eq!(cmd.outputs, vec![Utf8PathBuf::from("run_commands")]);
        assert_eq!(cmd.rule, RULE_CUSTOM_COMMAND);
        assert_eq!(cmd.variables.get("command").map(String::as_str), Some("a && b"));
        assert_eq!(cmd.order_only, paths(&["app"]));
        assert_eq!(cmd.pool.as_deref(), Some(CONSOLE_POOL));
        assert_eq!(alias.rule, RULE_PHONY);
        assert_eq!(alias.inputs, paths(&["run_commands"]));
        assert_eq!(alias.implicit, paths(&["app"]));
    }

    #[rstest]
    fn phony_without_commands_is_an_alias() {
        let g = graph(vec![
            target("app", TargetKind::Executable),
            with_deps(target("both", TargetKind::Phony), &["app"]),
        ]);
        let both = steps(&g, "both");
        assert_eq!(both.len(), 1);
        let alias = both.first().expect("alias");
        assert_eq!(alias.rule, RULE_PHONY);
        assert_eq!(alias.implicit, paths(&["app"]));
    }

    #[rstest]
    fn command_target_produces_its_output() {
        let mut generator = target("gen.cc", TargetKind::Command);
        generator.commands = vec!["./mkgen > gen.cc".into()];
        let g = graph(vec![generator]);
        let step = steps(&g, "gen.cc").first().expect("step").clone();
        assert_eq!(step.outputs, vec![Utf8PathBuf::from("gen.cc")]);
        assert_eq!(step.rule, RULE_CUSTOM_COMMAND);
        assert_eq!(
            step.variables.get("description").map(String::as_str),
            Some("Building gen.cc")
        );
    }

    #[rstest]
    fn generated_sources_are_read_from_the_build_tree() {
        let mut generator = target("gen.cc", TargetKind::Command);
        generator.commands = vec!["true".into()];
        let g = graph(vec![
            generator,
            with_sources(target("app", TargetKind::Executable), &["gen.cc", "main.cc"]),
        ]);
        let app = steps(&g, "app");
        let inputs: Vec<_> = app
            .iter()
            .filter(|s| s.rule == RULE_CXX)
            .flat_map(|s| s.inputs.clone())
            .collect();
        assert_eq!(
            inputs,
            vec![
                StepPath::Build("gen.cc".into()),
                StepPath::Source("main.cc".into()),
            ]
        );
    }

    #[rstest]
    #[case("boot.asm", RULE_ASM, Some("-felf"))]
    #[case("main.cc", RULE_CXX, None)]
    fn compile_rule_follows_extension(
        #[case] source: &str,
        #[case] rule: &str,
        #[case] flags: Option<&str>,
    ) {
        let mut kernel = with_sources(target("kernel", TargetKind::Executable), &[source]);
        kernel.flags = FlagSet::default().merge(&StageFlags {
            asm_flags: Some("-felf".into()),
            ..StageFlags::default()
        });
        let g = graph(vec![kernel]);
        let compile = steps(&g, "kernel").first().expect("compile").clone();
        assert_eq!(compile.rule, rule);
        assert_eq!(compile.variables.get("flags").map(String::as_str), flags);
    }

    #[rstest]
    fn unsupported_extension_fails() {
        let err = BuildGraph::from_tree(&SourceTree {
            targets: vec![with_sources(target("app", TargetKind::Executable), &["main.rs"])],
            build_files: Vec::new(),
        })
        .expect_err("unsupported");
        assert!(matches!(
            err,
            IrGenError::UnsupportedSourceExtension { ref source_path, .. }
                if source_path.as_str() == "main.rs"
        ));
    }

    #[rstest]
    fn resolution_is_deterministic() {
        let targets = vec![
            with_sources(target("core", TargetKind::ObjectLibrary), &["a.cc", "b.cc"]),
            with_deps(
                with_sources(target("app", TargetKind::Executable), &["main.cc"]),
                &["core"],
            ),
        ];
        assert_eq!(graph(targets.clone()), graph(targets));
    }
}
