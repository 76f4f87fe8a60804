//! # Workspace Module
//!
//! The workspace root is where `.metaclean.toml` is looked up: the top level
//! of the enclosing git repository, or the current directory outside of one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::git;

/// Workspace root selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Workspace {
  /// Workspace rooted at a git repository.
  Git { root: PathBuf },
  /// Workspace rooted at a plain directory.
  Directory { root: PathBuf },
}

impl Workspace {
  /// Resolves the workspace enclosing `dir`.
  pub fn resolve(dir: &Path) -> Result<Self> {
    match git::discover_repo_root(dir)? {
      Some(root) => Ok(Self::Git { root }),
      None => Ok(Self::Directory { root: dir.to_path_buf() }),
    }
  }

  pub fn root(&self) -> &Path {
    match self {
      Self::Git { root } | Self::Directory { root } => root.as_path(),
    }
  }

  pub const fn is_git(&self) -> bool {
    matches!(self, Self::Git { .. })
  }
}

/// Resolve the workspace enclosing the current directory.
pub fn resolve_workspace() -> Result<Workspace> {
  let current_dir = std::env::current_dir().with_context(|| "Failed to get current directory")?;
  Workspace::resolve(&current_dir)
}
