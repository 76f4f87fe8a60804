//! # File Collector Module
//!
//! Turns the command-line inputs into the ordered list of files to process.
//!
//! Each input is one of:
//! - an existing file, taken as is regardless of its extension
//! - an existing directory, walked recursively for files with a configured
//!   extension (hidden directories such as `.git` are skipped)
//! - a glob pattern, expanded against the filesystem
//! - anything else, kept as a path so the processor reports it as missing

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Characters that make an input a glob pattern rather than a path.
const GLOB_METACHARACTERS: [char; 3] = ['*', '?', '['];

/// Collects files from paths, directories and glob patterns.
pub struct FileCollector {
  /// Extensions (without the dot) accepted when walking directories.
  extensions: Vec<String>,
}

impl FileCollector {
  /// Creates a new FileCollector accepting the given extensions.
  pub const fn new(extensions: Vec<String>) -> Self {
    Self { extensions }
  }

  /// Expands `inputs` into a sorted, duplicate-free list of paths.
  ///
  /// # Errors
  ///
  /// Returns an error for a malformed glob pattern. Unreadable directory
  /// entries are logged and skipped.
  pub fn collect(&self, inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
      let path = Path::new(input);
      if path.is_dir() {
        files.extend(self.traverse_directory(path));
      } else if path.exists() || !is_glob(input) {
        files.insert(path.to_path_buf());
      } else {
        files.extend(expand_glob(input)?);
      }
    }

    debug!("Collected {} file(s) from {} input(s)", files.len(), inputs.len());
    Ok(files.into_iter().collect())
  }

  /// Returns true if `path` has one of the accepted extensions.
  pub fn has_accepted_extension(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| self.extensions.iter().any(|accepted| accepted == ext))
  }

  /// Traverses a directory recursively and collects the files with an
  /// accepted extension.
  pub fn traverse_directory(&self, dir: &Path) -> Vec<PathBuf> {
    debug!("Scanning directory: {}", dir.display());

    WalkDir::new(dir)
      .into_iter()
      .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
      .filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
          warn!("Skipping unreadable entry: {}", e);
          None
        }
      })
      .filter(|entry| entry.file_type().is_file())
      .map(walkdir::DirEntry::into_path)
      .filter(|path| self.has_accepted_extension(path))
      .collect()
  }
}

fn is_glob(input: &str) -> bool {
  input.contains(GLOB_METACHARACTERS)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
  name.to_str().is_some_and(|name| name.starts_with('.'))
}

/// Expands a glob pattern to the files it matches.
///
/// Explicit globs are not filtered by extension: the pattern already says
/// which files are wanted.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
  let entries = glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;

  let mut files = Vec::new();
  for entry in entries {
    match entry {
      Ok(path) if path.is_file() => files.push(path),
      Ok(_) => {}
      Err(e) => warn!("Skipping unreadable path: {}", e),
    }
  }

  if files.is_empty() {
    warn!("Pattern matched no files: {}", pattern);
  }
  Ok(files)
}
