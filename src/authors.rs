//! # Authors Module
//!
//! The file-header policy needs the list of people who touched a file. Where
//! that list comes from is hidden behind [`AuthorSource`]; the git-backed
//! implementation lives in [`crate::git`].
//!
//! Raw names from a source are turned into an author list by
//! [`canonical_authors`]: pseudonyms are mapped to canonical names first, then
//! duplicates are dropped and the result is sorted.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Looks up the raw author names associated with a file.
///
/// Implementations are called once per file that carries a file header and
/// are not cached by the caller.
pub trait AuthorSource {
  /// Returns the raw author names for `path`, in any order and possibly with
  /// duplicates.
  fn raw_authors(&self, path: &Path) -> Result<Vec<String>>;
}

/// Maps each raw name through `pseudonyms`, removes duplicates and sorts the
/// names ascending.
pub fn canonical_authors<I, S>(raw: I, pseudonyms: &HashMap<String, String>) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  raw
    .into_iter()
    .map(|name| {
      let name = name.as_ref();
      pseudonyms.get(name).map_or_else(|| name.to_string(), Clone::clone)
    })
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// An [`AuthorSource`] backed by a fixed table, for offline runs and tests.
///
/// Paths are looked up exactly as given; unknown paths fall back to
/// `default`.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthors {
  by_path: HashMap<PathBuf, Vec<String>>,
  default: Vec<String>,
}

impl StaticAuthors {
  pub fn new() -> Self {
    Self::default()
  }

  /// Uses `names` for every file that has no entry of its own.
  pub fn with_default<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
    self.default = names.into_iter().map(Into::into).collect();
    self
  }

  /// Registers `names` for `path`.
  pub fn with_file<S: Into<String>>(mut self, path: impl Into<PathBuf>, names: impl IntoIterator<Item = S>) -> Self {
    self
      .by_path
      .insert(path.into(), names.into_iter().map(Into::into).collect());
    self
  }
}

impl AuthorSource for StaticAuthors {
  fn raw_authors(&self, path: &Path) -> Result<Vec<String>> {
    Ok(self.by_path.get(path).unwrap_or(&self.default).clone())
  }
}
