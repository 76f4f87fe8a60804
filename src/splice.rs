//! # Splice Module
//!
//! Replaces one block's lines in a [`Document`] and shifts the coordinates of
//! every later block by the line-count delta of the edit.
//!
//! Blocks must be replaced in strictly increasing index order: a splice only
//! moves blocks after the replaced one, so earlier coordinates stay valid and
//! later ones are corrected before they are looked at.

use thiserror::Error;
use tracing::trace;

use crate::blocks::{Block, BlockList};
use crate::document::Document;

/// Errors raised when a splice cannot be applied consistently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpliceError {
  #[error("block index {index} is out of range ({len} blocks)")]
  NoSuchBlock { index: usize, len: usize },

  #[error("block {block} does not fit in a document of {len} lines")]
  OutOfBounds { block: Block, len: usize },
}

/// Replaces the lines of `blocks[index]` with `new_lines`.
///
/// The replaced block keeps its start and gets a new end; every block after
/// `index` moves by `new_lines.len() - block.len()`. Blocks before `index` are
/// untouched.
///
/// Returns the line-count delta.
///
/// # Errors
///
/// Fails without modifying anything if `index` is out of range or the block
/// does not lie within the document.
///
/// Overlapping blocks from lenient extraction can start inside the replaced
/// range. If the shift would move such a block before line 0 it collapses to
/// an empty block at its shifted end, which no mask matches.
pub fn replace(
  document: &mut Document,
  blocks: &mut BlockList,
  index: usize,
  new_lines: Vec<String>,
) -> Result<isize, SpliceError> {
  let block = blocks.get(index).ok_or(SpliceError::NoSuchBlock {
    index,
    len: blocks.len(),
  })?;
  if block.start > block.end || block.end > document.len() {
    return Err(SpliceError::OutOfBounds {
      block,
      len: document.len(),
    });
  }

  let new_len = new_lines.len();
  let delta = new_len as isize - block.len() as isize;

  let shifted = blocks.iter().skip(index + 1).map(|later| shift(*later, delta)).collect::<Vec<_>>();

  // Overlapping prefix is overwritten in place, the rest is inserted after the
  // old end or the excess old lines are removed.
  document.lines_mut().splice(block.start..block.end, new_lines);

  let entries = blocks.blocks_mut();
  entries[index].end = block.start + new_len;
  for (entry, moved) in entries.iter_mut().skip(index + 1).zip(shifted) {
    *entry = moved;
  }

  trace!("Replaced block {} with {} lines (delta {})", block, new_len, delta);
  Ok(delta)
}

fn shift(block: Block, delta: isize) -> Block {
  let end = block.end.saturating_add_signed(delta);
  match block.start.checked_add_signed(delta) {
    Some(start) => Block::new(start, end),
    None => {
      trace!("Block {} collapsed by a shift of {} lines", block, delta);
      Block::new(end, end)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  /// Three blocks of two lines each, separated by one code line.
  fn fixture() -> (Document, BlockList) {
    let document = Document::from_lines(["/* a", "*/", "x", "/* b", "*/", "y", "/* c", "*/"]);
    let blocks = BlockList::from(vec![Block::new(0, 2), Block::new(3, 5), Block::new(6, 8)]);
    (document, blocks)
  }

  #[test]
  fn test_grow_shifts_later_blocks() {
    let (mut document, mut blocks) = fixture();
    let delta = replace(&mut document, &mut blocks, 0, lines(&["/* a", "1", "2", "3", "*/"])).unwrap();

    assert_eq!(delta, 3);
    assert_eq!(
      blocks.as_slice(),
      &[Block::new(0, 5), Block::new(6, 8), Block::new(9, 11)]
    );
    assert_eq!(document.join_range(6, 8), "/* b\n*/");
    assert_eq!(document.join_range(9, 11), "/* c\n*/");
    assert!(blocks.is_well_formed(document.len()));
  }

  #[test]
  fn test_shrink_shifts_later_blocks() {
    let (mut document, mut blocks) = fixture();
    let delta = replace(&mut document, &mut blocks, 1, lines(&["/* b */"])).unwrap();

    assert_eq!(delta, -1);
    assert_eq!(
      blocks.as_slice(),
      &[Block::new(0, 2), Block::new(3, 4), Block::new(5, 7)]
    );
    assert_eq!(document.lines(), &lines(&["/* a", "*/", "x", "/* b */", "y", "/* c", "*/"]));
  }

  #[test]
  fn test_equal_length_is_pure_overwrite() {
    let (mut document, mut blocks) = fixture();
    let before = blocks.clone();
    let delta = replace(&mut document, &mut blocks, 2, lines(&["/* C", "*/"])).unwrap();

    assert_eq!(delta, 0);
    assert_eq!(blocks, before);
    assert_eq!(document.join_range(6, 8), "/* C\n*/");
  }

  #[test]
  fn test_replace_with_nothing_removes_block_lines() {
    let (mut document, mut blocks) = fixture();
    replace(&mut document, &mut blocks, 0, Vec::new()).unwrap();

    assert_eq!(blocks.as_slice(), &[Block::new(0, 0), Block::new(1, 3), Block::new(4, 6)]);
    assert_eq!(document.lines()[0], "x");
  }

  #[test]
  fn test_sequential_splices_keep_invariant() {
    let (mut document, mut blocks) = fixture();
    let replacements = [
      lines(&["/* a", "a1", "a2", "*/"]),
      lines(&["/* b */"]),
      lines(&["/* c", "c1", "c2", "c3", "*/"]),
    ];

    for (index, replacement) in replacements.into_iter().enumerate() {
      let expected = replacement.clone();
      replace(&mut document, &mut blocks, index, replacement).unwrap();
      assert!(blocks.is_well_formed(document.len()));
      let block = blocks.get(index).unwrap();
      assert_eq!(&document.lines()[block.start..block.end], expected.as_slice());
    }

    assert_eq!(document.lines()[blocks.get(0).unwrap().end], "x");
    assert_eq!(document.lines()[blocks.get(1).unwrap().end], "y");
  }

  #[test]
  fn test_out_of_range_index() {
    let (mut document, mut blocks) = fixture();
    let err = replace(&mut document, &mut blocks, 3, Vec::new()).unwrap_err();
    assert_eq!(err, SpliceError::NoSuchBlock { index: 3, len: 3 });
  }

  #[test]
  fn test_block_outside_document_is_rejected() {
    let mut document = Document::from_lines(["/*", "*/"]);
    let mut blocks = BlockList::from(vec![Block::new(0, 5)]);
    let err = replace(&mut document, &mut blocks, 0, Vec::new()).unwrap_err();
    assert!(matches!(err, SpliceError::OutOfBounds { .. }));
    assert_eq!(document.len(), 2);
  }

  #[test]
  fn test_overlapping_block_collapses_instead_of_underflowing() {
    // Lenient extraction of "/*", "*/", "x", "*/" yields overlapping blocks.
    let mut document = Document::from_lines(["/*", "*/", "x", "*/"]);
    let mut blocks = BlockList::from(vec![Block::new(0, 2), Block::new(0, 4)]);
    let delta = replace(&mut document, &mut blocks, 0, Vec::new()).unwrap();

    assert_eq!(delta, -2);
    assert_eq!(document.lines(), &lines(&["x", "*/"]));
    assert_eq!(blocks.as_slice(), &[Block::new(0, 0), Block::new(2, 2)]);
    assert_eq!(document.join_range(2, 2), "");
  }
}
