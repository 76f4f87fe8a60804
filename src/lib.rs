//! # metaclean
//!
//! A tool that keeps the metadata comment blocks of C and C++ sources
//! consistent: the copyright notice and the per-file banner naming the file,
//! describing it and listing its authors.
//!
//! `metaclean` only rewrites blocks that match a configured mask and differ
//! from their expected content. Everything else in a file is left byte for
//! byte as it was.
//!
//! ## Features
//!
//! * Masks that serve both as match patterns and as output templates
//! * Author lists derived from git history, with pseudonym mapping
//! * Dry-run and check modes with diffs, backups of rewritten files
//! * Lenient block detection compatible with older tooling, or strict
//!   detection that rejects unbalanced comment markers
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! use metaclean::authors::StaticAuthors;
//! use metaclean::mask::CompiledMask;
//! use metaclean::processor::{Processor, ProcessorConfig};
//! use metaclean::synthesizer::CopyrightPolicy;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mask = CompiledMask::new(r" \* Copyright \(C\) {}", &["([0-9-]+)"])?;
//!     let policy = CopyrightPolicy::new(mask, vec!["2018-2021".to_string()]);
//!
//!     let config = ProcessorConfig::new(vec![Box::new(policy)], Box::new(StaticAuthors::new()));
//!     let processor = Processor::new(config)?;
//!
//!     let run = processor.process(&[PathBuf::from("src/parser.hpp")])?;
//!     println!("{} file(s) updated", run.summary.files_updated);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`blocks`] - Finding comment blocks in a document
//! * [`mask`] - Compiling masks into matchers and literal templates
//! * [`synthesizer`] - Deciding whether a block is outdated
//! * [`splice`] - Replacing blocks and shifting the ones after them
//! * [`processor`] - Driving all of the above over files

pub mod authors;
pub mod blocks;
pub mod cli;
pub mod config;
pub mod diff;
pub mod document;
pub mod git;
pub mod logging;
pub mod mask;
pub mod output;
pub mod processor;
pub mod report;
pub mod splice;
pub mod synthesizer;
pub mod workspace;
