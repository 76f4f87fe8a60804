//! # Clean Command
//!
//! Checks and rewrites the metadata blocks of the given files.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::config::load_config;
use crate::diff::DiffManager;
use crate::git::GitAuthors;
use crate::info_log;
use crate::logging::{ColorMode, init_tracing, set_quiet, set_verbose};
use crate::output::{
  print_all_files_ok, print_blank_line, print_hint, print_pending_files, print_start_message, print_summary,
};
use crate::processor::{FileCollector, Processor, ProcessorConfig};
use crate::report::write_json_report;
use crate::workspace::resolve_workspace;

/// Arguments for the clean command
#[derive(Args, Debug, Default)]
pub struct CleanArgs {
  /// Files, directories or glob patterns to process. Directories are
  /// processed recursively.
  #[arg(required = true)]
  pub paths: Vec<String>,

  /// Path to config file (default: .metaclean.toml in workspace root)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Report outdated blocks without modifying files
  #[arg(long, short = 'n')]
  pub dry_run: bool,

  /// Like --dry-run, but exit with status 1 if any file would change
  #[arg(long)]
  pub check: bool,

  /// Show diff of pending changes in dry run mode
  #[arg(long)]
  pub show_diff: bool,

  /// Save diff of pending changes to a file in dry run mode
  #[arg(long, short = 'o', value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Reject unbalanced comment markers instead of guessing block boundaries
  #[arg(long)]
  pub strict_blocks: bool,

  /// Do not keep a `<file>~` copy of rewritten files
  #[arg(long)]
  pub no_backup: bool,

  /// Write a JSON report of the run to the specified path
  #[arg(long, value_name = "OUTPUT")]
  pub report_json: Option<PathBuf>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}

impl CleanArgs {
  /// Dry runs never write; `--check` implies one.
  pub const fn is_dry_run(&self) -> bool {
    self.dry_run || self.check
  }
}

/// Run the clean command with the given arguments.
///
/// # Returns
///
/// Success, unless a file failed or `--check` found outdated blocks.
///
/// # Errors
///
/// Returns an error for a missing or invalid configuration, an invalid glob
/// pattern, or a mask that disagrees with its policy.
pub fn run_clean(args: CleanArgs) -> Result<ExitCode> {
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let dry_run = args.is_dry_run();

  let workspace = resolve_workspace()?;
  debug!(
    "Using workspace root: {} (git: {})",
    workspace.root().display(),
    workspace.is_git()
  );

  let mut config = load_config(args.config.as_deref(), workspace.root())?;
  if args.strict_blocks {
    config.strict_blocks = true;
  }

  let files = FileCollector::new(config.extensions.clone()).collect(&args.paths)?;

  let processor_config = ProcessorConfig {
    dry_run,
    backup: !args.no_backup,
    diff_manager: Some(DiffManager::new(args.show_diff, args.save_diff)),
    ..ProcessorConfig::from_config(&config, Box::new(GitAuthors::new()))?
  };
  let processor = Processor::new(processor_config)?;

  print_start_message(files.len(), !dry_run);

  if files.is_empty() {
    print_blank_line();
    print_all_files_ok();
    return Ok(ExitCode::SUCCESS);
  }

  let run = processor.process(&files)?;
  let summary = &run.summary;

  print_blank_line();
  if dry_run {
    print_pending_files(&run.files);
  }
  if !summary.has_changes() && summary.files_failed == 0 {
    print_all_files_ok();
  }

  print_blank_line();
  print_summary(summary, !dry_run);

  if dry_run && summary.has_changes() {
    print_blank_line();
    print_hint("Run without --dry-run/--check to rewrite outdated blocks.");
  }

  if let Some(ref report_path) = args.report_json {
    write_json_report(report_path, &run.files, summary)
      .with_context(|| format!("Failed to write JSON report to {}", report_path.display()))?;
    info_log!("Report written to {}", report_path.display());
  }

  let failed = summary.files_failed > 0 || (args.check && summary.has_changes());
  Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
