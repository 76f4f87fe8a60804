//! # Blocks Module
//!
//! Locates delimited metadata blocks (`/*` ... `*/` comment regions) inside a
//! [`Document`] and keeps their coordinates in a [`BlockList`].
//!
//! Blocks are flat: the extractor assumes open and close markers alternate.
//! In [`BlockMode::Lenient`] mode it never fails, which means malformed input
//! produces odd blocks instead of an error:
//!
//! - a second `/*` before a `*/` replaces the pending open, so the outer open is
//!   forgotten;
//! - the pending open is not cleared by a `*/`, so a `*/` without a fresh `/*`
//!   yields a block starting at the previous open (or at line 0 if no open was
//!   ever seen). Such a block overlaps the one before it.
//!
//! [`BlockMode::Strict`] rejects both situations, plus an open marker that is
//! never closed. Strict mode skips one-line comments (`/* ... */` on a single
//! line) instead of treating them as an open marker.

use std::fmt;

use thiserror::Error;
use tracing::trace;

use crate::document::Document;

/// Marker that opens a metadata block (after trimming the line).
pub const BLOCK_OPEN: &str = "/*";

/// Marker that closes a metadata block (after trimming the line).
pub const BLOCK_CLOSE: &str = "*/";

/// Half-open line range `[start, end)` of one metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
  pub start: usize,
  pub end: usize,
}

impl Block {
  pub const fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  /// Number of lines covered by the block.
  pub const fn len(&self) -> usize {
    self.end - self.start
  }

  pub const fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

impl fmt::Display for Block {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.start, self.end)
  }
}

/// How the extractor treats unbalanced markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
  /// Never fail; unbalanced markers produce merged or stale blocks.
  #[default]
  Lenient,
  /// Reject unbalanced markers with a [`BlockError`].
  Strict,
}

/// Malformed block markers detected in strict mode. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
  #[error("line {line}: block close marker without a matching open marker")]
  UnmatchedClose { line: usize },

  #[error("line {line}: block opened at line {open_line} is not closed before a new one opens")]
  NestedOpen { line: usize, open_line: usize },

  #[error("line {line}: block open marker is never closed")]
  UnclosedOpen { line: usize },
}

/// Ordered list of block coordinates for one document.
///
/// The list is built in ascending start order and is only rewritten by the
/// splice engine, which shifts coordinates after each edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockList {
  blocks: Vec<Block>,
}

impl BlockList {
  pub const fn new() -> Self {
    Self { blocks: Vec::new() }
  }

  pub fn get(&self, index: usize) -> Option<Block> {
    self.blocks.get(index).copied()
  }

  pub const fn len(&self) -> usize {
    self.blocks.len()
  }

  pub const fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Block> {
    self.blocks.iter()
  }

  pub fn as_slice(&self) -> &[Block] {
    &self.blocks
  }

  pub(crate) const fn blocks_mut(&mut self) -> &mut Vec<Block> {
    &mut self.blocks
  }

  pub(crate) fn push(&mut self, block: Block) {
    self.blocks.push(block);
  }

  /// Whether the blocks are in ascending start order, pairwise disjoint and
  /// within `0..=doc_len`.
  pub fn is_well_formed(&self, doc_len: usize) -> bool {
    let in_bounds = self.blocks.iter().all(|b| b.start <= b.end && b.end <= doc_len);
    let ordered = self.blocks.windows(2).all(|pair| pair[0].end <= pair[1].start);
    in_bounds && ordered
  }
}

impl From<Vec<Block>> for BlockList {
  fn from(blocks: Vec<Block>) -> Self {
    Self { blocks }
  }
}

impl<'a> IntoIterator for &'a BlockList {
  type Item = &'a Block;
  type IntoIter = std::slice::Iter<'a, Block>;

  fn into_iter(self) -> Self::IntoIter {
    self.blocks.iter()
  }
}

/// Scans `document` top to bottom and returns its metadata blocks.
///
/// # Errors
///
/// Only in [`BlockMode::Strict`]: returns a [`BlockError`] for a close marker
/// without an open, an open marker while another block is still open, or an
/// open marker that reaches the end of the document.
pub fn extract_blocks(document: &Document, mode: BlockMode) -> Result<BlockList, BlockError> {
  let mut blocks = BlockList::new();

  // Lenient state: the last open index, never reset.
  let mut pending_open = 0usize;
  // Strict state: the currently open block, cleared on close.
  let mut open: Option<usize> = None;

  for (index, raw) in document.lines().iter().enumerate() {
    let line = raw.trim();

    if line.starts_with(BLOCK_OPEN) {
      if mode == BlockMode::Strict && line[BLOCK_OPEN.len()..].contains(BLOCK_CLOSE) {
        continue;
      }
      if mode == BlockMode::Strict
        && let Some(open_index) = open
      {
        return Err(BlockError::NestedOpen {
          line: index + 1,
          open_line: open_index + 1,
        });
      }
      pending_open = index;
      open = Some(index);
    } else if line.starts_with(BLOCK_CLOSE) {
      if mode == BlockMode::Strict && open.is_none() {
        return Err(BlockError::UnmatchedClose { line: index + 1 });
      }
      let block = Block::new(pending_open, index + 1);
      trace!("Found block {}", block);
      blocks.push(block);
      open = None;
    }
  }

  if mode == BlockMode::Strict
    && let Some(open_index) = open
  {
    return Err(BlockError::UnclosedOpen { line: open_index + 1 });
  }

  Ok(blocks)
}
