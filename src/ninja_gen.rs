//! Ninja file generator.
//!
//! [`NinjaWriter`] renders [`DescriptionWriter`] statements as Ninja syntax,
//! and [`generate`] lays out a complete `build.ninja`: header variables,
//! rules, every target block, the self-reconfiguration step and the default
//! goal. Output depends only on its inputs, so regenerating an unchanged tree
//! yields identical text.

use crate::ir::{
    BuildGraph, BuildStep, CONSOLE_POOL, DescriptionWriter, RULE_CLEAN, RULE_CONFIGURE, Rule,
    StepPath,
};
use crate::toolchain::Toolchain;
use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use std::borrow::Cow;

/// Name of the generated file inside the build directory.
pub const NINJA_FILE: &str = "build.ninja";

/// Minimum Ninja version the output relies on.
const NINJA_REQUIRED_VERSION: &str = "1.11";

/// Variable bound to the absolute source root.
const SOURCE_ROOT_VAR: &str = "root";

/// Parameters describing where and how the description is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Absolute source root, bound to `$root`.
    pub source_root: Utf8PathBuf,
    /// Absolute build directory, bound to `$build_root`.
    pub build_root: Utf8PathBuf,
    /// Selected preset, bound to `$build_preset`.
    pub preset: Option<String>,
    /// Programs used by the compile and link rules.
    pub toolchain: Toolchain,
    /// Executable re-run by the reconfigure step.
    pub entry_point: Utf8PathBuf,
}

/// Renders statements into an in-memory Ninja file.
#[derive(Debug, Default)]
pub struct NinjaWriter {
    out: String,
}

impl NinjaWriter {
    /// An empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { out: String::new() }
    }

    /// Consume the writer, returning the rendered text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, key: &str, value: &str) {
        self.line(&format!("  {key} = {value}"));
    }
}

/// Escape a path for use in a `build` or `default` line.
///
/// `$`, spaces and colons are significant in those positions and each gets
/// a `$` prefix.
fn escape_path(path: &Utf8Path) -> Cow<'_, str> {
    let raw = path.as_str();
    if !raw.contains(['$', ' ', ':']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 4);
    for c in raw.chars() {
        if matches!(c, '$' | ' ' | ':') {
            escaped.push('$');
        }
        escaped.push(c);
    }
    Cow::Owned(escaped)
}

/// Render a step input, placing source paths under `$root`.
fn render_input(input: &StepPath) -> Cow<'_, str> {
    match input {
        StepPath::Build(path) => escape_path(path),
        StepPath::Source(path) => Cow::Owned(format!("${SOURCE_ROOT_VAR}/{}", escape_path(path))),
    }
}

/// Convert a slice of paths into a space-separated, escaped string.
fn join(paths: &[Utf8PathBuf]) -> String {
    paths.iter().map(|p| escape_path(p)).join(" ")
}

fn join_inputs(inputs: &[StepPath]) -> String {
    inputs.iter().map(render_input).join(" ")
}

impl DescriptionWriter for NinjaWriter {
    fn comment(&mut self, text: &str) {
        self.line(&format!("# {text}"));
    }

    fn variable(&mut self, key: &str, value: &str) {
        self.line(&format!("{key} = {value}"));
    }

    fn rule(&mut self, rule: &Rule) {
        self.line(&format!("rule {}", rule.name));
        self.indented("command", &rule.command);
        if let Some(description) = &rule.description {
            self.indented("description", description);
        }
        if let Some(depfile) = &rule.depfile {
            self.indented("depfile", depfile);
        }
        if rule.generator {
            self.indented("generator", "1");
        }
        if let Some(deps) = &rule.deps_format {
            self.indented("deps", deps);
        }
    }

    fn build(&mut self, step: &BuildStep) {
        let mut line = format!("build {}: {}", join(&step.outputs), step.rule);
        if !step.inputs.is_empty() {
            line.push(' ');
            line.push_str(&join_inputs(&step.inputs));
        }
        if !step.implicit.is_empty() {
            line.push_str(" | ");
            line.push_str(&join_inputs(&step.implicit));
        }
        if !step.order_only.is_empty() {
            line.push_str(" || ");
            line.push_str(&join_inputs(&step.order_only));
        }
        self.line(&line);
        if let Some(pool) = &step.pool {
            self.indented("pool", pool);
        }
        for (key, value) in &step.variables {
            self.indented(key, value);
        }
    }

    fn default(&mut self, targets: &[Utf8PathBuf]) {
        self.line(&format!("default {}", join(targets)));
    }

    fn newline(&mut self) {
        self.out.push('\n');
    }
}

fn quote(arg: &str) -> Cow<'_, str> {
    shlex::try_quote(arg).unwrap_or(Cow::Borrowed(arg))
}

/// Command line re-running the generator with the current settings.
fn reconfigure_command(settings: &Settings) -> String {
    let toolchain = &settings.toolchain;
    let mut args = vec![
        quote(settings.entry_point.as_str()).into_owned(),
        "-C $root -B $build_root".to_owned(),
    ];
    if settings.preset.is_some() {
        args.push("-p $build_preset".to_owned());
    }
    args.push(format!(
        "--cxx {} --asm {} --ar {} configure",
        quote(&toolchain.cxx),
        quote(&toolchain.asm),
        quote(&toolchain.ar)
    ));
    args.join(" ")
}

/// Render `graph` as a complete Ninja file.
#[must_use]
pub fn generate(graph: &BuildGraph, settings: &Settings) -> String {
    let mut writer = NinjaWriter::new();
    write_description(graph, settings, &mut writer);
    writer.finish()
}

/// Drive `writer` through the full build description.
pub fn write_description(
    graph: &BuildGraph,
    settings: &Settings,
    writer: &mut impl DescriptionWriter,
) {
    writer.comment("Generated by ninjatree");
    writer.variable("ninja_required_version", NINJA_REQUIRED_VERSION);
    writer.newline();

    if let Some(preset) = &settings.preset {
        writer.variable("build_preset", preset);
    }
    writer.variable("build_root", settings.build_root.as_str());
    writer.variable(SOURCE_ROOT_VAR, settings.source_root.as_str());
    writer.newline();

    writer.comment("Rules");
    for rule in settings.toolchain.rules() {
        writer.rule(&rule);
        writer.newline();
    }

    graph.emit(writer);

    writer.comment("Regenerate build files if a build.toml changes.");
    writer.rule(&Rule {
        name: RULE_CONFIGURE.to_owned(),
        command: reconfigure_command(settings),
        description: Some("Reconfiguring...".to_owned()),
        generator: true,
        ..Rule::default()
    });
    let mut reconfigure = BuildStep::new(NINJA_FILE, RULE_CONFIGURE);
    reconfigure.implicit = std::iter::once(StepPath::Build(settings.entry_point.clone()))
        .chain(graph.build_files.iter().cloned().map(StepPath::Source))
        .collect();
    reconfigure.pool = Some(CONSOLE_POOL.to_owned());
    writer.build(&reconfigure);
    writer.newline();

    writer.build(&BuildStep::new(RULE_CLEAN, RULE_CLEAN));
    writer.default(std::slice::from_ref(&graph.default_target));
}
