//! # Logging Module
//!
//! Two output channels are used by metaclean:
//! - The per-file report (block matches, backups, updates) goes to stdout
//!   through [`info_log!`](crate::info_log) and the [`crate::output`] module,
//!   and is silenced by `--quiet`.
//! - Diagnostics go through `tracing` to stderr, plus
//!   [`verbose_log!`](crate::verbose_log) for messages only shown with `-v`.
//!
//! ## Example
//!
//! ```rust
//! use metaclean::logging::{ColorMode, set_verbose};
//! use metaclean::{info_log, verbose_log};
//!
//! set_verbose();
//! ColorMode::Never.apply();
//!
//! verbose_log!("Processing file: {}", "parser.hpp");
//! info_log!("update '{}'", "parser.hpp");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};
use owo_colors::{OwoColorize, Stream};

/// Logs a message to stderr if verbose mode is enabled.
///
/// It uses the same format string syntax as the standard [`eprintln!`] macro.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}

/// Logs a message to stdout unless quiet mode is enabled.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        if !$crate::logging::is_quiet() {
            $crate::logging::print_info_log(&format!($($arg)*));
        }
    };
}

/// Prints an info message, highlighted when colors are enabled.
pub fn print_info_log(message: &str) {
  println!("{}", message.if_supports_color(Stream::Stdout, |m| m.yellow()));
}
