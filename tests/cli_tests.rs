mod common;

use std::fs;
use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use common::{copyright_block, write_config};
use predicates::prelude::*;
use tempfile::tempdir;

fn metaclean() -> Result<Command> {
  let mut cmd = Command::cargo_bin("metaclean")?;
  cmd.env_remove("METACLEAN_CONFIG").env_remove("RUST_LOG").arg("--colors=never");
  Ok(cmd)
}

#[test]
fn test_rewrites_outdated_block() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), format!("{}\n", copyright_block("2017-2019")))?;

  metaclean()?
    .arg("a.hpp")
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("process 'a.hpp'\nmatched copyright header: \"2017-2019\" [UPDATE]"))
    .stdout(predicate::str::contains("create backup 'a.hpp~'"))
    .stdout(predicate::str::contains("update 'a.hpp'"))
    .stdout(predicate::str::contains("Summary: 1 updated, 0 unchanged, 0 failed"));

  assert_eq!(
    fs::read_to_string(temp_dir.path().join("a.hpp"))?,
    format!("{}\n", copyright_block("2018-2021"))
  );
  assert!(temp_dir.path().join("a.hpp~").exists());
  Ok(())
}

#[test]
fn test_check_fails_on_outdated_block() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  let original = format!("{}\n", copyright_block("2017-2019"));
  fs::write(temp_dir.path().join("a.hpp"), &original)?;

  metaclean()?
    .args(["--check", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("1 file with outdated metadata"))
    .stdout(predicate::str::contains("Summary: 1 outdated"));

  assert_eq!(fs::read_to_string(temp_dir.path().join("a.hpp"))?, original);
  assert!(!temp_dir.path().join("a.hpp~").exists());
  Ok(())
}

#[test]
fn test_check_passes_when_up_to_date() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), format!("{}\n", copyright_block("2018-2021")))?;

  metaclean()?
    .args(["--check", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("[OK]"))
    .stdout(predicate::str::contains("All metadata blocks are up to date."));
  Ok(())
}

#[test]
fn test_dry_run_shows_diff() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), format!("{}\n", copyright_block("2017-2019")))?;

  metaclean()?
    .args(["--dry-run", "--show-diff", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stderr(predicate::str::contains("Diff for a.hpp:"))
    .stderr(predicate::str::contains("+ * Copyright (C) 2018-2021"));
  Ok(())
}

#[test]
fn test_missing_config_is_fatal() -> Result<()> {
  let temp_dir = tempdir()?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2017-2019"))?;

  metaclean()?
    .arg("a.hpp")
    .current_dir(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("No configuration found"));
  Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
  let temp_dir = tempdir()?;
  fs::write(
    temp_dir.path().join(".metaclean.toml"),
    "[copyright-header]\nmask = \"{}\"\nslots = [\"([0-9]\"]\nreplace = [\"x\"]\n",
  )?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2017-2019"))?;

  metaclean()?
    .arg("a.hpp")
    .current_dir(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid mask in [copyright-header]"));
  Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
  let temp_dir = tempdir()?;
  let config_dir = tempdir()?;
  let config_path = write_config(config_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2017-2019"))?;

  metaclean()?
    .arg("--config")
    .arg(&config_path)
    .arg("a.hpp")
    .current_dir(temp_dir.path())
    .assert()
    .success();

  assert_eq!(fs::read_to_string(temp_dir.path().join("a.hpp"))?, copyright_block("2018-2021"));
  Ok(())
}

#[test]
fn test_directory_input_uses_extensions() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  let src = temp_dir.path().join("src");
  fs::create_dir_all(&src)?;
  fs::write(src.join("a.cpp"), copyright_block("2017-2019"))?;
  fs::write(src.join("notes.txt"), copyright_block("2017-2019"))?;

  metaclean()?
    .arg("src")
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Processing 1 file..."));

  assert_eq!(fs::read_to_string(src.join("a.cpp"))?, copyright_block("2018-2021"));
  assert_eq!(fs::read_to_string(src.join("notes.txt"))?, copyright_block("2017-2019"));
  Ok(())
}

#[test]
fn test_missing_file_is_reported_and_run_continues() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2017-2019"))?;

  metaclean()?
    .args(["missing.hpp", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("does not exist"));

  assert_eq!(fs::read_to_string(temp_dir.path().join("a.hpp"))?, copyright_block("2018-2021"));
  Ok(())
}

#[test]
fn test_strict_blocks_flag() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  let original = format!("/* stray\n{}\n", copyright_block("2017-2019"));
  fs::write(temp_dir.path().join("a.hpp"), &original)?;

  metaclean()?
    .args(["--strict-blocks", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("Malformed comment blocks"));

  assert_eq!(fs::read_to_string(temp_dir.path().join("a.hpp"))?, original);
  Ok(())
}

#[test]
fn test_json_report() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2017-2019"))?;

  metaclean()?
    .args(["--no-backup", "--report-json", "report.json", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .success();

  let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(temp_dir.path().join("report.json"))?)?;
  assert_eq!(report["summary"]["files_updated"], 1);
  assert_eq!(report["files"][0]["action"], "updated");
  assert_eq!(report["files"][0]["blocks"][0]["header"], "copyright header");
  assert!(!temp_dir.path().join("a.hpp~").exists());
  Ok(())
}

#[test]
fn test_quiet_mode() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2018-2021"))?;

  metaclean()?
    .args(["--quiet", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
  Ok(())
}

#[test]
fn test_verbose_mode() -> Result<()> {
  let temp_dir = tempdir()?;
  write_config(temp_dir.path())?;
  fs::write(temp_dir.path().join("a.hpp"), copyright_block("2018-2021"))?;

  metaclean()?
    .args(["-v", "a.hpp"])
    .current_dir(temp_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("process 'a.hpp'"))
    .stderr(predicate::str::contains("metadata blocks: [[0, 3)]"));
  Ok(())
}
