//! # metaclean
//!
//! Keeps copyright notices and file/author banners in C and C++ sources in
//! line with the project configuration and git history.

use std::process::ExitCode;

use anyhow::Result;
use metaclean::cli::{Cli, run_clean};

fn main() -> Result<ExitCode> {
  let cli = Cli::parse_args();
  run_clean(cli.clean_args)
}
