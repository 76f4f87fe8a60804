//! # Report Module
//!
//! Records what happened to every processed file and summarizes the run.
//!
//! The same records feed the console summary and the optional JSON report
//! written with `--report-json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Information about a processed file for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
  /// Path to the file
  #[serde(with = "path_serialization")]
  pub path: PathBuf,
  /// Outcome for the whole file
  pub action: FileAction,
  /// One entry per block that matched a header mask
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub blocks: Vec<BlockReport>,
  /// Why the file was skipped, for [`FileAction::Failed`]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl FileReport {
  pub fn new(path: impl Into<PathBuf>, action: FileAction) -> Self {
    Self {
      path: path.into(),
      action,
      blocks: Vec::new(),
      error: None,
    }
  }

  /// A report for a file that was skipped because of `error`.
  pub fn failed(path: impl Into<PathBuf>, error: &anyhow::Error) -> Self {
    Self {
      error: Some(format!("{error:#}")),
      ..Self::new(path, FileAction::Failed)
    }
  }
}

/// Possible outcomes for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
  /// At least one block was rewritten and the file was saved
  Updated,
  /// At least one block is outdated, but nothing was written (dry run)
  WouldUpdate,
  /// Every matched block already carried the expected content
  Unchanged,
  /// The file could not be processed and was left untouched
  Failed,
}

/// A block that matched one of the header masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
  /// Zero-based index of the block within the file
  pub index: usize,
  /// Name of the header policy that matched
  pub header: String,
  /// Fields captured from the block before any rewrite
  pub fields: Vec<String>,
  /// Whether the block was (or would be) rewritten
  pub updated: bool,
}

/// Helper module for serializing/deserializing PathBuf
mod path_serialization {
  use std::path::PathBuf;

  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S>(path: &std::path::Path, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&path.to_string_lossy())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    Ok(PathBuf::from(s))
  }
}

/// Summary of the processing results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingSummary {
  /// Total number of files processed
  pub total_files: usize,
  /// Files rewritten on disk
  pub files_updated: usize,
  /// Files that would be rewritten (dry run or check mode)
  pub files_would_update: usize,
  /// Files that needed no change
  pub files_unchanged: usize,
  /// Files skipped because of an error
  pub files_failed: usize,
  /// Number of blocks rewritten or pending a rewrite
  pub blocks_updated: usize,
  /// Total processing time
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  /// Processing time in seconds for serialization
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
  /// Timestamp when the summary was created
  pub timestamp: i64,
}

impl ProcessingSummary {
  /// Create a ProcessingSummary from a collection of FileReports
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let count = |action: FileAction| files.iter().filter(|f| f.action == action).count();

    Self {
      total_files: files.len(),
      files_updated: count(FileAction::Updated),
      files_would_update: count(FileAction::WouldUpdate),
      files_unchanged: count(FileAction::Unchanged),
      files_failed: count(FileAction::Failed),
      blocks_updated: files.iter().flat_map(|f| &f.blocks).filter(|b| b.updated).count(),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      timestamp: Local::now().timestamp(),
    }
  }

  /// Returns true if any file is outdated, whether or not it was rewritten.
  pub const fn has_changes(&self) -> bool {
    self.files_updated + self.files_would_update > 0
  }
}

#[derive(Serialize)]
struct JsonReport<'a> {
  generated: String,
  summary: &'a ProcessingSummary,
  files: &'a [FileReport],
}

/// Render the JSON report.
pub fn render_json(files: &[FileReport], summary: &ProcessingSummary) -> Result<String> {
  let report = JsonReport {
    generated: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    summary,
    files,
  };
  serde_json::to_string_pretty(&report).with_context(|| "Failed to serialize report")
}

/// Write the JSON report to `output_path`.
pub fn write_json_report(output_path: &Path, files: &[FileReport], summary: &ProcessingSummary) -> Result<()> {
  let content = render_json(files, summary)?;
  fs::write(output_path, content).with_context(|| format!("Failed to write report to {}", output_path.display()))
}
