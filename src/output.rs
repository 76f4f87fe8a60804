//! # Output Module
//!
//! This module centralizes all user-facing output for metaclean.
//!
//! Per-block and per-file messages go to stdout and are silenced by `-q`.
//! Errors always go to stderr. The summary line is printed unless quiet.

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Up to date
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Rewritten or pending a rewrite
  pub const UPDATED: &str = "\u{21bb}"; // ↻
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print the initial "Processing N files..." or "Checking N files..." message.
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Announce a file before its blocks are reported: `process 'a.hpp'`.
pub fn print_file_start(path: &Path) {
  if is_quiet() {
    return;
  }
  println!("process '{}'", make_relative_path(path));
}

/// Print one matched block: the header kind, the captured fields and whether
/// it is rewritten.
///
/// Format: `matched copyright header: "2017-2019" [UPDATE]`
pub fn print_block_match(header: &str, fields: &[String], updated: bool) {
  if is_quiet() {
    return;
  }

  let fields = fields.iter().map(|f| format!("{f:?}")).collect::<Vec<_>>().join(", ");
  let status = if updated {
    "[UPDATE]".if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
  } else {
    "[OK]".if_supports_color(Stream::Stdout, |s| s.green()).to_string()
  };

  println!("matched {}: {} {}", header, fields, status);
}

/// Print the backup notice: `create backup 'a.hpp~'`.
pub fn print_backup(backup: &Path) {
  if is_quiet() {
    return;
  }
  println!("create backup '{}'", make_relative_path(backup));
}

/// Print the rewrite notice: `update 'a.hpp'`.
pub fn print_update(path: &Path) {
  if is_quiet() {
    return;
  }
  println!(
    "{} update '{}'",
    symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    make_relative_path(path)
  );
}

/// Print a file-level error. Always shown, on stderr.
pub fn print_file_error(path: &Path, error: &anyhow::Error) {
  eprintln!(
    "{} {}: {:#}",
    symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
    make_relative_path(path),
    error
  );
}

/// Print the list of files that would be rewritten by a real run.
///
/// Shows up to `DEFAULT_FILE_LIST_LIMIT` files, or all of them in verbose
/// mode. In quiet mode only the bare paths are printed, for scripting.
pub fn print_pending_files(files: &[FileReport]) {
  let pending: Vec<_> = files.iter().filter(|f| f.action == FileAction::WouldUpdate).collect();
  if pending.is_empty() {
    return;
  }

  if is_quiet() {
    for file in &pending {
      println!("{}", make_relative_path(&file.path));
    }
    return;
  }

  let count = pending.len();
  println!(
    "{} {} {} with outdated metadata:",
    symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
    count,
    plural(count)
  );

  let limit = if is_verbose() { count } else { DEFAULT_FILE_LIST_LIMIT };
  for file in pending.iter().take(limit) {
    println!("  {}", make_relative_path(&file.path));
  }

  if count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

/// Print the processing summary.
///
/// Format: "Summary: X updated, Y unchanged, Z failed"
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let (changed, changed_label) = if modify_mode {
    (summary.files_updated, "updated")
  } else {
    (summary.files_would_update, "outdated")
  };

  let changed_str = if changed > 0 {
    changed.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
  } else {
    changed.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  };
  let unchanged_str = summary.files_unchanged.if_supports_color(Stream::Stdout, |s| s.cyan());
  let failed_str = if summary.files_failed > 0 {
    summary
      .files_failed
      .if_supports_color(Stream::Stdout, |s| s.red())
      .to_string()
  } else {
    summary.files_failed.to_string()
  };

  let mut summary_line = format!(
    "Summary: {} {}, {} unchanged, {} failed",
    changed_str, changed_label, unchanged_str, failed_str
  );

  if is_verbose() {
    summary_line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{}", summary_line);
}

/// Print the success message when nothing needed a change.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }
  println!(
    "{} All metadata blocks are up to date.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }
  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

const fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// Make a path relative to the current directory for display.
fn make_relative_path(path: &Path) -> String {
  if path.is_absolute()
    && let Ok(current_dir) = std::env::current_dir()
    && let Some(relative) = pathdiff::diff_paths(path, &current_dir)
  {
    return relative.to_string_lossy().to_string();
  }
  path.to_string_lossy().to_string()
}
