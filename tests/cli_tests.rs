//! Integration tests invoking the compiled binary with `assert_cmd`.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use test_support::BuildTree;

const SIMPLE: &str = r#"
cxx_flags = "-Wall"

[[executable]]
name = "hello"
sources = ["hello.cc"]
"#;

fn ninjatree() -> Result<Command> {
    Command::cargo_bin("ninjatree").context("locate ninjatree binary")
}

#[test]
fn help_lists_subcommands() -> Result<()> {
    ninjatree()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("configure").and(predicate::str::contains("manifest")));
    Ok(())
}

#[test]
fn configure_is_the_default_command() -> Result<()> {
    let tree = BuildTree::with_files(&[("build.toml", SIMPLE)])?;
    ninjatree()?.current_dir(tree.root()).assert().success();
    let ninja = fs::read_to_string(tree.root().join("build/build.ninja"))?;
    ensure!(ninja.contains("build hello: link hello-objs/hello.cc.o\n"));
    ensure!(ninja.contains(&format!("root = {}\n", tree.root().canonicalize_utf8()?)));
    Ok(())
}

#[test]
fn configure_honours_directory_options() -> Result<()> {
    let tree = BuildTree::with_files(&[("src/build.toml", SIMPLE)])?;
    ninjatree()?
        .current_dir(tree.root())
        .args(["-C", "src", "-B", "out", "-p", "release", "configure"])
        .assert()
        .success();
    let ninja = fs::read_to_string(tree.root().join("out/build.ninja"))?;
    ensure!(ninja.contains("build_preset = release\n"));
    ensure!(!tree.root().join("build").exists());
    Ok(())
}

#[test]
fn manifest_streams_to_stdout_when_dash() -> Result<()> {
    let tree = BuildTree::with_files(&[("build.toml", SIMPLE)])?;
    ninjatree()?
        .current_dir(tree.root())
        .args(["--cxx", "g++", "manifest", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rule cxx\n  command = g++ "));
    ensure!(!tree.root().join("-").exists());
    ensure!(!tree.root().join("build").exists());
    Ok(())
}

#[test]
fn unknown_preset_fails_without_output() -> Result<()> {
    let tree = BuildTree::with_files(&[("build.toml", "[preset.debug]\ncxx_flags = \"-O0\"\n")])?;
    ninjatree()?
        .current_dir(tree.root())
        .args(["-p", "nightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nightly"));
    ensure!(!tree.root().join("build/build.ninja").exists());
    Ok(())
}

#[test]
fn missing_build_file_is_reported() -> Result<()> {
    let tree = BuildTree::new()?;
    ninjatree()?
        .current_dir(tree.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("build.toml"));
    Ok(())
}
