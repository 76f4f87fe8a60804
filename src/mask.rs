//! # Mask Module
//!
//! A mask is a template of literal text with ordered `{}` slots. The same
//! template string serves two purposes:
//!
//! - filled with sub-patterns, it is the regex source used to recognise a
//!   block and extract its fields ([`compile_matcher`]);
//! - filled with values, after the escaped metacharacters listed in
//!   [`ESCAPED_METACHARACTERS`] lose their backslash, it is the literal text
//!   written back into the file ([`render_literal`]).
//!
//! `{{` and `}}` stand for literal braces in both uses.
//!
//! ## Example
//!
//! ```rust
//! use metaclean::mask::{compile_matcher, render_literal};
//!
//! # fn main() -> Result<(), metaclean::mask::MaskError> {
//! let template = r" \* Copyright \(C\) {}";
//! let pattern = compile_matcher(template, &[r"([0-9-]+)"])?;
//! assert!(pattern.is_match(" * Copyright (C) 2017-2019"));
//!
//! let text = render_literal(template, &["2018-2021"])?;
//! assert_eq!(text, " * Copyright (C) 2018-2021");
//! # Ok(())
//! # }
//! ```

use regex::Regex;
use thiserror::Error;

/// Regex metacharacters that a mask may escape with a backslash so that they
/// match literally. Rendering drops the backslash in front of exactly these.
pub const ESCAPED_METACHARACTERS: [char; 5] = ['*', '(', ')', '+', '!'];

/// Errors raised while compiling or applying a mask.
#[derive(Debug, Error)]
pub enum MaskError {
  #[error("mask template has an unbalanced '{brace}' at byte {offset}")]
  UnbalancedBrace { brace: char, offset: usize },

  #[error("mask has {slots} slot(s) but {given} value(s) were supplied")]
  SlotCount { slots: usize, given: usize },

  #[error("mask pattern does not compile: {0}")]
  Pattern(#[from] regex::Error),

  #[error("mask captured {captured} field(s) but its replacement expects {expected}")]
  FieldCountMismatch { captured: usize, expected: usize },
}

/// Removes the backslash in front of every escaped metacharacter.
///
/// Other escape sequences are left untouched.
pub fn remove_escapes(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut chars = text.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '\\'
      && let Some(&next) = chars.peek()
      && ESCAPED_METACHARACTERS.contains(&next)
    {
      continue;
    }
    out.push(c);
  }
  out
}

/// A parsed mask template: the literal pieces around each slot.
///
/// There is always one more literal piece than there are slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
  literals: Vec<String>,
}

impl Mask {
  /// Parses `template`, splitting it at each `{}` slot.
  ///
  /// # Errors
  ///
  /// Returns [`MaskError::UnbalancedBrace`] for a lone `{` or `}` that is not
  /// part of `{}`, `{{` or `}}`.
  pub fn parse(template: &str) -> Result<Self, MaskError> {
    let mut literals = Vec::new();
    let mut current = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
      match c {
        '{' => match chars.peek() {
          Some((_, '{')) => {
            chars.next();
            current.push('{');
          }
          Some((_, '}')) => {
            chars.next();
            literals.push(std::mem::take(&mut current));
          }
          _ => return Err(MaskError::UnbalancedBrace { brace: '{', offset }),
        },
        '}' => match chars.peek() {
          Some((_, '}')) => {
            chars.next();
            current.push('}');
          }
          _ => return Err(MaskError::UnbalancedBrace { brace: '}', offset }),
        },
        _ => current.push(c),
      }
    }
    literals.push(current);

    Ok(Self { literals })
  }

  /// Number of `{}` slots in the template.
  pub fn slot_count(&self) -> usize {
    self.literals.len() - 1
  }

  /// Interleaves the literal pieces with `fills`, mapping each literal piece
  /// through `literal`.
  fn fill<S: AsRef<str>>(&self, fills: &[S], literal: impl Fn(&str) -> String) -> Result<String, MaskError> {
    if fills.len() != self.slot_count() {
      return Err(MaskError::SlotCount {
        slots: self.slot_count(),
        given: fills.len(),
      });
    }

    let mut out = literal(&self.literals[0]);
    for (fill, piece) in fills.iter().zip(&self.literals[1..]) {
      out.push_str(fill.as_ref());
      out.push_str(&literal(piece));
    }
    Ok(out)
  }

  /// Compiles the mask into an anchored regex with each slot replaced by the
  /// matching entry of `slot_patterns`.
  pub fn compile_matcher<S: AsRef<str>>(&self, slot_patterns: &[S]) -> Result<Regex, MaskError> {
    let source = self.fill(slot_patterns, str::to_string)?;
    Ok(Regex::new(&format!("^(?:{source})"))?)
  }

  /// Fills the slots with `values` without touching the literal pieces.
  ///
  /// Used for replacement templates, which are plain text rather than regex
  /// source.
  pub fn format<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
    self.fill(values, str::to_string)
  }

  /// Renders the literal text of the mask with each slot replaced by the
  /// matching entry of `values`.
  pub fn render_literal<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
    self.fill(values, remove_escapes)
  }
}

/// Parses `template` and compiles it into a prefix-matching regex.
pub fn compile_matcher<S: AsRef<str>>(template: &str, slot_patterns: &[S]) -> Result<Regex, MaskError> {
  Mask::parse(template)?.compile_matcher(slot_patterns)
}

/// Parses `template` and renders it as literal text.
pub fn render_literal<S: AsRef<str>>(template: &str, values: &[S]) -> Result<String, MaskError> {
  Mask::parse(template)?.render_literal(values)
}

/// A mask compiled once and reused for every block of every file.
#[derive(Debug, Clone)]
pub struct CompiledMask {
  mask: Mask,
  pattern: Regex,
}

impl CompiledMask {
  /// Parses `template` and compiles its match pattern.
  pub fn new<S: AsRef<str>>(template: &str, slot_patterns: &[S]) -> Result<Self, MaskError> {
    let mask = Mask::parse(template)?;
    let pattern = mask.compile_matcher(slot_patterns)?;
    Ok(Self { mask, pattern })
  }

  pub const fn mask(&self) -> &Mask {
    &self.mask
  }

  pub const fn pattern(&self) -> &Regex {
    &self.pattern
  }

  /// Number of capture groups in the compiled pattern.
  pub fn group_count(&self) -> usize {
    self.pattern.captures_len() - 1
  }

  /// Attempts a prefix match of `text` and returns the captured fields.
  ///
  /// Text after the end of the match is ignored. Groups that did not
  /// participate in the match yield an empty string.
  ///
  /// # Errors
  ///
  /// Returns [`MaskError::FieldCountMismatch`] when the match succeeds but the
  /// number of captured groups differs from `expected_fields`. That means the
  /// mask and the policy consuming it are inconsistent.
  pub fn match_fields(&self, text: &str, expected_fields: usize) -> Result<Option<Vec<String>>, MaskError> {
    let Some(caps) = self.pattern.captures(text) else {
      return Ok(None);
    };

    let fields: Vec<String> = caps
      .iter()
      .skip(1)
      .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
      .collect();

    if fields.len() != expected_fields {
      return Err(MaskError::FieldCountMismatch {
        captured: fields.len(),
        expected: expected_fields,
      });
    }

    Ok(Some(fields))
  }

  /// Renders the literal block text for `values`.
  pub fn render<S: AsRef<str>>(&self, values: &[S]) -> Result<String, MaskError> {
    self.mask.render_literal(values)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const COPYRIGHT_MASK: &str = "/\\* demo: C\\+\\+ library\n \\* Copyright \\(C\\) {}\n";

  #[test]
  fn test_remove_escapes() {
    assert_eq!(remove_escapes(r"\* \( \) \+ \!"), "* ( ) + !");
    assert_eq!(remove_escapes(r"C\+\+"), "C++");
  }

  #[test]
  fn test_remove_escapes_keeps_other_sequences() {
    assert_eq!(remove_escapes(r"\\file \d \."), r"\\file \d \.");
    assert_eq!(remove_escapes(r"trailing\"), r"trailing\");
  }

  #[test]
  fn test_parse_slots_and_braces() {
    let mask = Mask::parse("a{}b{{c}}{}").unwrap();
    assert_eq!(mask.slot_count(), 2);
    assert_eq!(mask.render_literal(&["1", "2"]).unwrap(), "a1b{c}2");
  }

  #[test]
  fn test_parse_rejects_lone_braces() {
    assert!(matches!(
      Mask::parse("a{b").unwrap_err(),
      MaskError::UnbalancedBrace { brace: '{', offset: 1 }
    ));
    assert!(matches!(
      Mask::parse("a}b").unwrap_err(),
      MaskError::UnbalancedBrace { brace: '}', offset: 1 }
    ));
  }

  #[test]
  fn test_format_keeps_backslashes() {
    let template = Mask::parse(r"  \author {}").unwrap();
    assert_eq!(template.format(&["alice"]).unwrap(), r"  \author alice");
  }

  #[test]
  fn test_slot_count_mismatch() {
    let err = render_literal("{} and {}", &["only one"]).unwrap_err();
    assert!(matches!(err, MaskError::SlotCount { slots: 2, given: 1 }));
  }

  #[test]
  fn test_invalid_pattern_is_reported() {
    let err = compile_matcher("{}", &["(unclosed"]).unwrap_err();
    assert!(matches!(err, MaskError::Pattern(_)));
  }

  #[test]
  fn test_match_is_prefix_only() {
    let compiled = CompiledMask::new(COPYRIGHT_MASK, &["([0-9-]+)"]).unwrap();
    let text = "/* demo: C++ library\n * Copyright (C) 2017-2019\n *\n * more text\n */";
    let fields = compiled.match_fields(text, 1).unwrap();
    assert_eq!(fields, Some(vec!["2017-2019".to_string()]));
  }

  #[test]
  fn test_match_must_start_at_block_start() {
    let compiled = CompiledMask::new(r" \* Copyright \(C\) {}", &["([0-9-]+)"]).unwrap();
    assert_eq!(compiled.match_fields("/*\n * Copyright (C) 2019", 1).unwrap(), None);
  }

  #[test]
  fn test_no_match_is_not_an_error() {
    let compiled = CompiledMask::new(COPYRIGHT_MASK, &["([0-9-]+)"]).unwrap();
    assert_eq!(compiled.match_fields("/*! \\file foo.hpp */", 1).unwrap(), None);
  }

  #[test]
  fn test_field_count_mismatch_is_fatal() {
    let compiled = CompiledMask::new(COPYRIGHT_MASK, &["(([0-9]+)-[0-9]+)"]).unwrap();
    assert_eq!(compiled.group_count(), 2);
    let text = "/* demo: C++ library\n * Copyright (C) 2017-2019\n";
    let err = compiled.match_fields(text, 1).unwrap_err();
    assert!(matches!(err, MaskError::FieldCountMismatch { captured: 2, expected: 1 }));
  }

  #[test]
  fn test_render_then_match_recovers_fields() {
    let template = "/\\*!\n  @file {}\n  @brief {}\n\\*/";
    let compiled = CompiledMask::new(template, &["(.*)", "(.*)"]).unwrap();
    let values = ["foo.hpp".to_string(), "Does things (quickly)!".to_string()];
    let text = compiled.render(&values).unwrap();
    let fields = compiled.match_fields(&text, 2).unwrap();
    assert_eq!(fields, Some(values.to_vec()));
  }

  #[test]
  fn test_unescaped_text_is_matched_by_wildcard_pattern() {
    let templates = [
      COPYRIGHT_MASK,
      "/\\*!\n  @file {}\n  @brief {}\n\n{}\n\\*/",
      "\\(\\+\\) \\! {}",
    ];
    for template in templates {
      let mask = Mask::parse(template).unwrap();
      let values = vec!["v".to_string(); mask.slot_count()];
      let literal = mask.render_literal(&values).unwrap();
      for marker in ESCAPED_METACHARACTERS {
        assert!(!literal.contains(&format!("\\{marker}")), "{literal:?} still escaped");
      }
      let wildcards = vec!["(.*)"; mask.slot_count()];
      let pattern = mask.compile_matcher(&wildcards).unwrap();
      assert!(pattern.is_match(&literal), "{template:?} does not match {literal:?}");
    }
  }
}
