#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// A configuration with both header kinds, as written to `.metaclean.toml`.
pub const CONFIG_TOML: &str = r#"
extensions = ["hpp", "cpp"]

[copyright-header]
mask = "/\\* demo: C\\+\\+ library\n \\* Copyright \\(C\\) {}\n \\*/"
slots = ["([0-9-]+)"]
replace = ["2018-2021"]

[file-header]
mask = "/\\*!\n  @file {}\n  @brief {}\n{}\n\\*/"
slots = ["(.*)", "(.*)", "\\n((?:  @author .*(?:\\n  @author .*)*)?)"]
replace = ["{}", "{}", "  @author {}"]

[author-pseudonyms]
"tuser" = "Test User"
"#;

/// Renders a copyright block for `years`.
pub fn copyright_block(years: &str) -> String {
  format!("/* demo: C++ library\n * Copyright (C) {years}\n */")
}

/// Renders a file header block.
pub fn file_header(name: &str, brief: &str, authors: &[&str]) -> String {
  let mut out = format!("/*!\n  @file {name}\n  @brief {brief}\n");
  for author in authors {
    out.push_str(&format!("\n  @author {author}"));
  }
  out.push_str("\n*/");
  out
}

/// Writes `CONFIG_TOML` to `<dir>/.metaclean.toml`.
pub fn write_config(dir: &Path) -> Result<PathBuf> {
  let path = dir.join(".metaclean.toml");
  fs::write(&path, CONFIG_TOML).with_context(|| format!("Failed to write {}", path.display()))?;
  Ok(path)
}

/// Checks if git is available on the system.
pub fn is_git_available() -> bool {
  Command::new("git").arg("--version").status().is_ok()
}

/// Runs a git command in the given directory, returning an error with stderr on
/// failure.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<()> {
  let output = Command::new("git")
    .args(args)
    .current_dir(dir)
    .output()
    .with_context(|| format!("Failed to execute git {:?}", args))?;

  if !output.status.success() {
    anyhow::bail!("git {:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
  }
  Ok(())
}

/// Initializes a git repository in the given directory with deterministic
/// settings.
///
/// Configures:
/// - Default branch name set to `main`
/// - User name and email for commits
/// - Disables commit signing for test isolation
pub fn init_git_repo(dir: &Path) -> Result<()> {
  run_git(dir, &["init"])?;
  run_git(dir, &["config", "init.defaultBranch", "main"])?;
  run_git(dir, &["branch", "-M", "main"])?;
  run_git(dir, &["config", "user.name", "Test User"])?;
  run_git(dir, &["config", "user.email", "test@example.com"])?;
  run_git(dir, &["config", "commit.gpgsign", "false"])?;
  Ok(())
}

/// Stages a file and creates a commit as the configured user.
pub fn git_add_and_commit(dir: &Path, file: &str, message: &str) -> Result<()> {
  run_git(dir, &["add", file])?;
  run_git(dir, &["commit", "-m", message])
}

/// Writes `content` to `file`, stages it and commits it as `author`.
pub fn commit_as(dir: &Path, file: &str, content: &str, author: &str, message: &str) -> Result<()> {
  let path = dir.join(file);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(&path, content)?;
  run_git(dir, &["add", file])?;
  let author = format!("{author} <{}@example.com>", author.to_lowercase().replace(' ', "."));
  run_git(dir, &["commit", "-m", message, "--author", &author])
}
