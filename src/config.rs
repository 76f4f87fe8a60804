//! # Configuration Module
//!
//! This module loads the masks, expected values and author pseudonyms that
//! drive a metaclean run.
//!
//! Configuration is read from a `.metaclean.toml` file at the workspace root,
//! from the file named by the `METACLEAN_CONFIG` environment variable, or
//! from an explicit `--config` path.
//!
//! ```toml
//! strict-blocks = false
//! extensions = ["hpp", "cpp"]
//!
//! [copyright-header]
//! mask = "/\\* demo\n \\* Copyright \\(C\\) {}\n \\*/"
//! slots = ["([0-9-]+)"]
//! replace = ["2018-2021"]
//!
//! [file-header]
//! mask = "/\\*!\n  @file {}\n  @brief {}\n{}\n\\*/"
//! slots = ["(.*)", "(.*)", "\\n((?:  @author .*(?:\\n  @author .*)*)?)"]
//! replace = ["{}", "{}", "  @author {}"]
//!
//! [author-pseudonyms]
//! "jdoe" = "Jane Doe"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::mask::{CompiledMask, Mask, MaskError};
use crate::synthesizer::{CopyrightPolicy, FileHeaderPolicy, FileHeaderTemplates, HeaderPolicy};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".metaclean.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "METACLEAN_CONFIG";

/// Extensions scanned when a directory is given on the command line.
pub const DEFAULT_EXTENSIONS: [&str; 7] = ["h", "hh", "hpp", "c", "cc", "cpp", "inc"];

fn default_extensions() -> Vec<String> {
  DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_authors_prefix() -> String {
  "\n".to_string()
}

/// The copyright block: a mask and the field values it must carry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CopyrightHeaderConfig {
  /// Mask template with `{}` slots.
  pub mask: String,

  /// One capturing sub-pattern per slot.
  pub slots: Vec<String>,

  /// Expected value per captured field.
  pub replace: Vec<String>,
}

/// The per-file header: file name, description and author lines.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FileHeaderConfig {
  /// Mask template with exactly three `{}` slots.
  pub mask: String,

  /// One capturing sub-pattern per slot.
  pub slots: Vec<String>,

  /// Templates for the file name, the description and a single author line,
  /// each with one `{}` slot.
  pub replace: Vec<String>,

  /// Text put in front of the author lines when the header is rewritten.
  #[serde(default = "default_authors_prefix")]
  pub authors_prefix: String,
}

/// Main configuration struct for metaclean.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
  /// File extensions (without the leading dot) collected from directories.
  #[serde(default = "default_extensions")]
  pub extensions: Vec<String>,

  /// Reject unbalanced block markers instead of guessing.
  #[serde(default)]
  pub strict_blocks: bool,

  #[serde(default)]
  pub copyright_header: Option<CopyrightHeaderConfig>,

  #[serde(default)]
  pub file_header: Option<FileHeaderConfig>,

  /// Raw author name to canonical name.
  #[serde(default)]
  pub author_pseudonyms: HashMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      extensions: default_extensions(),
      strict_blocks: false,
      copyright_header: None,
      file_header: None,
      author_pseudonyms: HashMap::new(),
    }
  }
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A section is structurally inconsistent.
  #[error("Invalid [{section}] configuration: {message}")]
  Invalid { section: &'static str, message: String },

  /// A mask or replacement template does not compile.
  #[error("Invalid mask in [{section}]: {source}")]
  Mask {
    section: &'static str,
    source: MaskError,
  },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read,
  /// parsed or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!(
      "Loaded {} header mask(s) and {} author pseudonym(s)",
      usize::from(config.copyright_header.is_some()) + usize::from(config.file_header.is_some()),
      config.author_pseudonyms.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - At least one header section is present
  /// - Extension names don't include the leading dot
  /// - Every mask compiles and its slots, capture groups and replacements
  ///   line up
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.copyright_header.is_none() && self.file_header.is_none() {
      return Err(ConfigError::Invalid {
        section: "root",
        message: "at least one of [copyright-header] or [file-header] must be configured".to_string(),
      });
    }

    for ext in &self.extensions {
      if ext.starts_with('.') {
        return Err(ConfigError::Invalid {
          section: "root",
          message: format!("extension '{ext}' should not include leading dot"),
        });
      }
    }

    self.build_policies().map(|_| ())
  }

  /// Compiles the configured masks into header policies, in the order they
  /// are tried on each block: copyright header first, then file header.
  pub fn build_policies(&self) -> Result<Vec<Box<dyn HeaderPolicy>>, ConfigError> {
    let mut policies: Vec<Box<dyn HeaderPolicy>> = Vec::new();

    if let Some(section) = &self.copyright_header {
      policies.push(Box::new(section.build()?));
    }
    if let Some(section) = &self.file_header {
      policies.push(Box::new(section.build(self.author_pseudonyms.clone())?));
    }

    Ok(policies)
  }
}

/// Compiles `mask` with `slots` and checks that it captures `expected` fields.
fn compile_section(
  section: &'static str,
  mask: &str,
  slots: &[String],
  expected: usize,
) -> Result<CompiledMask, ConfigError> {
  let compiled = CompiledMask::new(mask, slots).map_err(|source| ConfigError::Mask { section, source })?;

  if compiled.group_count() != expected {
    return Err(ConfigError::Invalid {
      section,
      message: format!(
        "mask captures {} group(s) but {} replacement(s) are configured",
        compiled.group_count(),
        expected
      ),
    });
  }

  Ok(compiled)
}

impl CopyrightHeaderConfig {
  const SECTION: &'static str = "copyright-header";

  fn build(&self) -> Result<CopyrightPolicy, ConfigError> {
    let mask = compile_section(Self::SECTION, &self.mask, &self.slots, self.replace.len())?;
    Ok(CopyrightPolicy::new(mask, self.replace.clone()))
  }
}

impl FileHeaderConfig {
  const SECTION: &'static str = "file-header";

  fn build(&self, pseudonyms: HashMap<String, String>) -> Result<FileHeaderPolicy, ConfigError> {
    if self.replace.len() != FileHeaderPolicy::FIELD_COUNT {
      return Err(ConfigError::Invalid {
        section: Self::SECTION,
        message: format!(
          "expected {} replacement templates (file name, description, author line), found {}",
          FileHeaderPolicy::FIELD_COUNT,
          self.replace.len()
        ),
      });
    }

    let mask = compile_section(Self::SECTION, &self.mask, &self.slots, FileHeaderPolicy::FIELD_COUNT)?;

    let template = |text: &str| -> Result<Mask, ConfigError> {
      let parsed = Mask::parse(text).map_err(|source| ConfigError::Mask {
        section: Self::SECTION,
        source,
      })?;
      if parsed.slot_count() != 1 {
        return Err(ConfigError::Invalid {
          section: Self::SECTION,
          message: format!("replacement template '{text}' must contain exactly one '{{}}'"),
        });
      }
      Ok(parsed)
    };

    let templates = FileHeaderTemplates {
      filename: template(&self.replace[0])?,
      description: template(&self.replace[1])?,
      author_line: template(&self.replace[2])?,
    };

    Ok(FileHeaderPolicy::new(
      mask,
      templates,
      self.authors_prefix.clone(),
      pseudonyms,
    ))
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `METACLEAN_CONFIG` environment variable
/// 3. `.metaclean.toml` in the workspace root
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  // 1. Explicit path from CLI takes highest priority
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  // 2. Check environment variable
  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  // 3. Check workspace root
  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// A run without configuration has nothing to enforce, so a missing file is
/// an error.
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path) -> Result<Config> {
  let Some(path) = discover_config_path(explicit_path, workspace_root) else {
    anyhow::bail!(
      "No configuration found: create {} in {} or pass --config",
      DEFAULT_CONFIG_FILENAME,
      workspace_root.display()
    );
  };

  Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}
