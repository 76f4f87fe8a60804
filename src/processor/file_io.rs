//! # File I/O Module
//!
//! This module provides file reading and writing utilities for the processor:
//! whole-file reads, `<name>~` backups and atomic in-place rewrites.

use std::ffi::OsString;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Suffix appended to a file name to form its backup.
pub const BACKUP_SUFFIX: &str = "~";

/// File I/O operations for the processor.
///
/// This struct provides static methods for reading and writing files.
pub struct FileIO;

impl FileIO {
  /// Read full file content.
  ///
  /// Missing files get their own message since they are the common case of a
  /// stale path on the command line.
  pub fn read_full_content(path: &Path) -> Result<String> {
    if !path.exists() {
      anyhow::bail!("File does not exist: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
  }

  /// Returns the backup location for `path`: the same path with `~` appended
  /// to the file name.
  pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
  }

  /// Writes `original` to the backup location of `path`, replacing any
  /// earlier backup.
  ///
  /// # Returns
  ///
  /// The path of the backup file.
  pub fn write_backup(path: &Path, original: &str) -> Result<PathBuf> {
    let backup = Self::backup_path(path);
    std::fs::write(&backup, original).with_context(|| format!("Failed to write backup: {}", backup.display()))?;
    Ok(backup)
  }

  /// Replaces the content of `path` atomically.
  ///
  /// The new content is written to a temporary file in the same directory,
  /// synced, given the permissions of the existing file and renamed over it.
  /// A crash leaves either the old or the new file, never a partial one.
  pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    let permissions = std::fs::metadata(path).map(|m| m.permissions()).ok();

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
      .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;

    temp_file
      .write_all(content.as_bytes())
      .with_context(|| format!("Failed to write file: {}", path.display()))?;
    temp_file
      .as_file()
      .sync_all()
      .with_context(|| format!("Failed to sync file: {}", path.display()))?;

    if let Some(permissions) = permissions {
      temp_file
        .as_file()
        .set_permissions(permissions)
        .with_context(|| format!("Failed to copy permissions to {}", path.display()))?;
    }

    temp_file
      .persist(path)
      .map_err(|e| e.error)
      .with_context(|| format!("Failed to replace file: {}", path.display()))?;

    Ok(())
  }
}
