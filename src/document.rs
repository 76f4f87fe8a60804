//! # Document Module
//!
//! A [`Document`] is the line-oriented view of one file that the block
//! extractor scans and the splice engine mutates. Lines are stored without
//! their terminators; `\n` and `\r\n` are treated the same when reading.

use std::fmt;

/// One file's contents as an ordered sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
  lines: Vec<String>,
  trailing_newline: bool,
}

impl Document {
  /// Splits `content` into lines.
  ///
  /// Whether the text ended with a line terminator is remembered so that
  /// [`render`](Self::render) can reproduce it.
  pub fn parse(content: &str) -> Self {
    Self {
      lines: content.lines().map(str::to_string).collect(),
      trailing_newline: content.ends_with('\n'),
    }
  }

  /// Builds a document from already split lines, without a trailing newline.
  pub fn from_lines<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      lines: lines.into_iter().map(Into::into).collect(),
      trailing_newline: false,
    }
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Mutable access for the splice engine.
  pub(crate) const fn lines_mut(&mut self) -> &mut Vec<String> {
    &mut self.lines
  }

  pub const fn len(&self) -> usize {
    self.lines.len()
  }

  pub const fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Joins the lines in `start..end` with `\n`, the form a mask is matched
  /// against.
  pub fn join_range(&self, start: usize, end: usize) -> String {
    self.lines[start..end].join("\n")
  }

  /// Renders the document back into file content using `\n` separators.
  pub fn render(&self) -> String {
    let mut out = self.lines.join("\n");
    if self.trailing_newline {
      out.push('\n');
    }
    out
  }
}

impl fmt::Display for Document {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render())
  }
}
