//! # Processor Module
//!
//! This module drives metaclean over a set of files. For each file it reads
//! the content, extracts the comment blocks, runs every configured header
//! policy on every block in order, splices the rewritten blocks into the
//! document and, if anything changed, backs up the original and writes the
//! result.
//!
//! The module is organized into several submodules:
//! - [`file_io`] - File reading, backups and atomic writes
//! - [`file_collector`] - Expanding paths, directories and globs into files
//!
//! The [`Processor`] struct is the main entry point for all file operations.

mod file_collector;
mod file_io;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
pub use file_collector::FileCollector;
pub use file_io::{BACKUP_SUFFIX, FileIO};
use thiserror::Error;
use tracing::{debug, trace};

use crate::authors::AuthorSource;
use crate::blocks::{BlockMode, extract_blocks};
use crate::config::{Config, ConfigError};
use crate::diff::DiffManager;
use crate::document::Document;
use crate::mask::MaskError;
use crate::report::{BlockReport, FileAction, FileReport, ProcessingSummary};
use crate::splice::{self, SpliceError};
use crate::synthesizer::{FileContext, HeaderPolicy, SynthError};
use crate::{output, verbose_log};

/// Configuration for creating a Processor instance.
pub struct ProcessorConfig {
  /// Header policies, tried in order on every block.
  pub policies: Vec<Box<dyn HeaderPolicy>>,
  pub author_source: Box<dyn AuthorSource>,
  pub block_mode: BlockMode,

  /// Report what would change without writing anything.
  pub dry_run: bool,
  /// Keep the original content in `<path>~` before rewriting.
  pub backup: bool,

  pub diff_manager: Option<DiffManager>,
}

impl ProcessorConfig {
  /// Creates a new ProcessorConfig with required fields and sensible defaults.
  ///
  /// Use struct update syntax to override specific fields:
  /// ```ignore
  /// ProcessorConfig {
  ///     dry_run: true,
  ///     ..ProcessorConfig::new(policies, Box::new(GitAuthors::new()))
  /// }
  /// ```
  pub fn new(policies: Vec<Box<dyn HeaderPolicy>>, author_source: Box<dyn AuthorSource>) -> Self {
    Self {
      policies,
      author_source,
      block_mode: BlockMode::Lenient,
      dry_run: false,
      backup: true,
      diff_manager: None,
    }
  }

  /// Builds the policies and block mode described by `config`.
  pub fn from_config(config: &Config, author_source: Box<dyn AuthorSource>) -> Result<Self, ConfigError> {
    let block_mode = if config.strict_blocks {
      BlockMode::Strict
    } else {
      BlockMode::Lenient
    };

    Ok(Self {
      block_mode,
      ..Self::new(config.build_policies()?, author_source)
    })
  }
}

/// Why a file could not be processed.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// A mask and its policy disagree. Aborts the whole run.
  #[error(transparent)]
  Fatal(#[from] MaskError),

  /// Something is wrong with this file only. It is reported and skipped.
  #[error(transparent)]
  File(#[from] anyhow::Error),
}

impl From<SynthError> for ProcessError {
  fn from(err: SynthError) -> Self {
    match err {
      SynthError::Mask(e) => Self::Fatal(e),
      other => Self::File(other.into()),
    }
  }
}

impl From<SpliceError> for ProcessError {
  fn from(err: SpliceError) -> Self {
    Self::File(err.into())
  }
}

/// Outcome of processing all files of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
  pub files: Vec<FileReport>,
  pub summary: ProcessingSummary,
}

/// Processor for checking and rewriting metadata blocks.
///
/// The `Processor` is responsible for:
/// - Reading each file into a [`Document`]
/// - Extracting its comment blocks
/// - Matching every block against every header policy, in order
/// - Splicing rewritten blocks back in, shifting later blocks
/// - Writing a backup and the new content, or only reporting in dry runs
pub struct Processor {
  policies: Vec<Box<dyn HeaderPolicy>>,
  author_source: Box<dyn AuthorSource>,
  block_mode: BlockMode,
  dry_run: bool,
  backup: bool,
  diff_manager: DiffManager,
}

impl Processor {
  /// Creates a new processor with the specified configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if no header policy is configured.
  pub fn new(config: ProcessorConfig) -> Result<Self> {
    if config.policies.is_empty() {
      anyhow::bail!("At least one header policy is required");
    }

    Ok(Self {
      policies: config.policies,
      author_source: config.author_source,
      block_mode: config.block_mode,
      dry_run: config.dry_run,
      backup: config.backup,
      diff_manager: config.diff_manager.unwrap_or_default(),
    })
  }

  pub const fn is_dry_run(&self) -> bool {
    self.dry_run
  }

  /// Processes every file in `files`, in order.
  ///
  /// Files that cannot be processed are reported and skipped. The run only
  /// stops early when a mask turns out to be inconsistent with its policy,
  /// since every later file would hit the same problem.
  ///
  /// # Errors
  ///
  /// Returns an error for a mask/policy contract violation.
  pub fn process(&self, files: &[PathBuf]) -> Result<RunReport> {
    let start_time = Instant::now();
    let mut reports = Vec::with_capacity(files.len());

    for path in files {
      match self.process_file(path) {
        Ok(report) => reports.push(report),
        Err(ProcessError::File(err)) => {
          output::print_file_error(path, &err);
          reports.push(FileReport::failed(path, &err));
        }
        Err(ProcessError::Fatal(err)) => {
          return Err(err).with_context(|| format!("Inconsistent header configuration at {}", path.display()));
        }
      }
    }

    let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());
    debug!(
      "Processed {} files in {:.2}s",
      summary.total_files, summary.processing_time_secs
    );

    Ok(RunReport {
      files: reports,
      summary,
    })
  }

  /// Processes a single file.
  ///
  /// Blocks are visited in ascending index order and each policy sees the
  /// block's current text, so a block rewritten by one policy is matched by
  /// the next one in its new form. A rewrite is spliced in immediately, which
  /// moves every later block before it is looked at.
  pub fn process_file(&self, path: &Path) -> Result<FileReport, ProcessError> {
    output::print_file_start(path);

    let content = FileIO::read_full_content(path)?;
    let original = Document::parse(&content);
    let mut document = original.clone();

    let mut blocks = extract_blocks(&document, self.block_mode)
      .map_err(|e| anyhow::Error::new(e).context(format!("Malformed comment blocks in {}", path.display())))?;
    verbose_log!(
      "metadata blocks: [{}]",
      blocks.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    let ctx = FileContext::new(path, self.author_source.as_ref());

    let mut block_reports = Vec::new();
    for index in 0..blocks.len() {
      for policy in &self.policies {
        let Some(block) = blocks.get(index) else {
          break;
        };
        if block.end > document.len() {
          return Err(
            SpliceError::OutOfBounds {
              block,
              len: document.len(),
            }
            .into(),
          );
        }

        let text = document.join_range(block.start, block.end);
        let Some(evaluation) = policy.evaluate(&text, &ctx)? else {
          continue;
        };

        let updated = evaluation.decision.needs_update();
        output::print_block_match(policy.name(), &evaluation.fields, updated);

        if let Some(new_lines) = evaluation.decision.new_lines() {
          let delta = splice::replace(&mut document, &mut blocks, index, new_lines.to_vec())?;
          trace!("{} block {} rewritten, later blocks moved by {}", policy.name(), index, delta);
        }

        block_reports.push(BlockReport {
          index,
          header: policy.name().to_string(),
          fields: evaluation.fields,
          updated,
        });
      }
    }

    let action = if document == original {
      FileAction::Unchanged
    } else if self.dry_run {
      self
        .diff_manager
        .display_diff(path, &content, &document.render())
        .with_context(|| format!("Failed to render diff for {}", path.display()))?;
      FileAction::WouldUpdate
    } else {
      self.write_back(path, &content, &document)?;
      FileAction::Updated
    };

    Ok(FileReport {
      blocks: block_reports,
      ..FileReport::new(path, action)
    })
  }

  fn write_back(&self, path: &Path, original: &str, document: &Document) -> Result<()> {
    if self.backup {
      let backup = FileIO::write_backup(path, original)?;
      output::print_backup(&backup);
    }

    FileIO::write_atomic(path, &document.render())?;
    output::print_update(path);
    Ok(())
  }
}
