//! # Synthesizer Module
//!
//! Decides whether a recognised metadata block is up to date and, if not,
//! produces its replacement lines.
//!
//! Two policies implement [`HeaderPolicy`]:
//!
//! - [`CopyrightPolicy`] compares the captured fields with a fixed expected
//!   tuple from the configuration.
//! - [`FileHeaderPolicy`] expects the file's own name, keeps the captured
//!   description, and expects one author line per canonical author of the
//!   file.
//!
//! Policies never touch the file system; the author list comes from the
//! [`AuthorSource`] in the [`FileContext`].

use std::cell::OnceCell;
use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::authors::{AuthorSource, canonical_authors};
use crate::mask::{CompiledMask, Mask, MaskError};

/// Failure while evaluating a block.
#[derive(Debug, Error)]
pub enum SynthError {
  /// The mask or its replacement templates are inconsistent. Fatal for the
  /// whole run.
  #[error(transparent)]
  Mask(#[from] MaskError),

  /// The author lookup for the file failed. Only this file is affected.
  #[error("failed to look up authors of {path}: {cause:#}")]
  Authors { path: String, cause: anyhow::Error },
}

/// What to do with a matched block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
  /// The block already has the expected content.
  UpToDate,
  /// The block must be replaced by these lines.
  Update(Vec<String>),
}

impl Decision {
  pub const fn needs_update(&self) -> bool {
    matches!(self, Self::Update(_))
  }

  /// The replacement lines, if any.
  pub fn new_lines(&self) -> Option<&[String]> {
    match self {
      Self::UpToDate => None,
      Self::Update(lines) => Some(lines),
    }
  }
}

/// Result of running a policy against a block whose text matched its mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
  /// Fields captured from the current block text.
  pub fields: Vec<String>,
  pub decision: Decision,
}

/// Per-file data available to policies.
///
/// The author lookup runs at most once per file, the first time a policy asks
/// for it, and is shared by every block of that file.
pub struct FileContext<'a> {
  pub path: &'a Path,
  authors: &'a dyn AuthorSource,
  raw_authors: OnceCell<Vec<String>>,
}

impl<'a> FileContext<'a> {
  pub const fn new(path: &'a Path, authors: &'a dyn AuthorSource) -> Self {
    Self {
      path,
      authors,
      raw_authors: OnceCell::new(),
    }
  }

  /// Raw author names of the file, looked up on first use.
  pub fn raw_authors(&self) -> anyhow::Result<&[String]> {
    if let Some(raw) = self.raw_authors.get() {
      return Ok(raw);
    }
    let raw = self.authors.raw_authors(self.path)?;
    Ok(self.raw_authors.get_or_init(|| raw))
  }
}

/// A way of recognising one kind of metadata block and computing its
/// expected content.
pub trait HeaderPolicy {
  /// Human-readable name used in console output.
  fn name(&self) -> &'static str;

  fn mask(&self) -> &CompiledMask;

  /// Number of fields the mask must capture.
  fn field_count(&self) -> usize;

  /// Compares `fields` with the expected values for the file.
  fn decide(&self, fields: &[String], ctx: &FileContext<'_>) -> Result<Decision, SynthError>;

  /// Matches `block_text` against the mask and decides on the captured
  /// fields. Returns `Ok(None)` when the block is not of this kind.
  fn evaluate(&self, block_text: &str, ctx: &FileContext<'_>) -> Result<Option<Evaluation>, SynthError> {
    let Some(fields) = self.mask().match_fields(block_text, self.field_count())? else {
      return Ok(None);
    };
    let decision = self.decide(&fields, ctx)?;
    Ok(Some(Evaluation { fields, decision }))
  }
}

fn split_lines(text: &str) -> Vec<String> {
  text.split('\n').map(str::to_string).collect()
}

/// Keeps a copyright block in line with configured field values.
#[derive(Debug, Clone)]
pub struct CopyrightPolicy {
  mask: CompiledMask,
  expected: Vec<String>,
}

impl CopyrightPolicy {
  pub const fn new(mask: CompiledMask, expected: Vec<String>) -> Self {
    Self { mask, expected }
  }

  pub fn expected(&self) -> &[String] {
    &self.expected
  }
}

impl HeaderPolicy for CopyrightPolicy {
  fn name(&self) -> &'static str {
    "copyright header"
  }

  fn mask(&self) -> &CompiledMask {
    &self.mask
  }

  fn field_count(&self) -> usize {
    self.expected.len()
  }

  fn decide(&self, fields: &[String], _ctx: &FileContext<'_>) -> Result<Decision, SynthError> {
    if fields == self.expected.as_slice() {
      return Ok(Decision::UpToDate);
    }
    let text = self.mask.render(&self.expected)?;
    Ok(Decision::Update(split_lines(&text)))
  }
}

/// Replacement templates of a file header, one `{}` slot each.
#[derive(Debug, Clone)]
pub struct FileHeaderTemplates {
  /// Filled with the file's base name.
  pub filename: Mask,
  /// Filled with the description captured from the block.
  pub description: Mask,
  /// Filled with one canonical author name per line.
  pub author_line: Mask,
}

/// Keeps a per-file banner (file name, brief description and author list)
/// in line with the file name and its history.
pub struct FileHeaderPolicy {
  mask: CompiledMask,
  templates: FileHeaderTemplates,
  authors_prefix: String,
  pseudonyms: HashMap<String, String>,
}

impl FileHeaderPolicy {
  /// Number of fields of a file header: file name, description, authors.
  pub const FIELD_COUNT: usize = 3;

  /// `authors_prefix` is put in front of the author lines when the block is
  /// rendered but is not part of the captured author field.
  pub const fn new(
    mask: CompiledMask,
    templates: FileHeaderTemplates,
    authors_prefix: String,
    pseudonyms: HashMap<String, String>,
  ) -> Self {
    Self {
      mask,
      templates,
      authors_prefix,
      pseudonyms,
    }
  }

  /// The field values the header of `ctx.path` should carry, given the
  /// description captured from its current block.
  pub fn expected_fields(&self, description: &str, ctx: &FileContext<'_>) -> Result<Vec<String>, SynthError> {
    let file_name = ctx
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_default();

    let raw = ctx.raw_authors().map_err(|cause| SynthError::Authors {
      path: ctx.path.display().to_string(),
      cause,
    })?;

    let author_lines = canonical_authors(raw, &self.pseudonyms)
      .iter()
      .map(|author| self.templates.author_line.format(&[author]))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(vec![
      self.templates.filename.format(&[file_name])?,
      self.templates.description.format(&[description])?,
      author_lines.join("\n"),
    ])
  }
}

impl HeaderPolicy for FileHeaderPolicy {
  fn name(&self) -> &'static str {
    "file and author information"
  }

  fn mask(&self) -> &CompiledMask {
    &self.mask
  }

  fn field_count(&self) -> usize {
    Self::FIELD_COUNT
  }

  fn decide(&self, fields: &[String], ctx: &FileContext<'_>) -> Result<Decision, SynthError> {
    let mut expected = self.expected_fields(&fields[1], ctx)?;
    if fields == expected.as_slice() {
      return Ok(Decision::UpToDate);
    }

    expected[2].insert_str(0, &self.authors_prefix);
    let text = self.mask.render(&expected)?;
    Ok(Decision::Update(split_lines(&text)))
  }
}
