//! # Git Module
//!
//! This module contains functionality for interacting with git repositories:
//! locating the repository root and collecting the authors of a file from its
//! history.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::{Commit, DiffOptions, ErrorCode, Mailmap, Repository};
use tracing::{debug, trace};

use crate::authors::AuthorSource;

/// Returns the working directory of the repository containing `dir`, or
/// `None` if `dir` is not inside a (non-bare) git repository.
pub fn discover_repo_root(dir: &Path) -> Result<Option<PathBuf>> {
  match Repository::discover(dir) {
    Ok(repo) => Ok(repo.workdir().map(Path::to_path_buf)),
    Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
    Err(e) => Err(e).with_context(|| format!("Failed to open git repository at {}", dir.display())),
  }
}

/// Author lookup from git history.
///
/// Walks every commit reachable from HEAD and keeps the non-merge commits
/// whose diff against their parent touches the file, which is what
/// `git shortlog -s -- <path>` reports. Author names are resolved through the
/// repository's mailmap when one exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitAuthors;

impl GitAuthors {
  pub const fn new() -> Self {
    Self
  }
}

impl AuthorSource for GitAuthors {
  fn raw_authors(&self, path: &Path) -> Result<Vec<String>> {
    let absolute = std::fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    let search_dir = absolute.parent().unwrap_or(absolute.as_path());

    let repo = Repository::discover(search_dir)
      .with_context(|| format!("Failed to find git repository for {}", path.display()))?;
    let workdir = repo
      .workdir()
      .with_context(|| format!("Repository for {} has no working directory", path.display()))?;
    let workdir = std::fs::canonicalize(workdir)
      .with_context(|| format!("Failed to resolve repository root: {}", workdir.display()))?;

    let relative = absolute
      .strip_prefix(&workdir)
      .with_context(|| format!("{} is outside repository {}", path.display(), workdir.display()))?;
    let pathspec = relative.to_string_lossy().replace('\\', "/");

    let mailmap = repo.mailmap().ok();

    let mut revwalk = repo.revwalk().with_context(|| "Failed to create revision walker")?;
    revwalk.push_head().with_context(|| "Failed to start history walk at HEAD")?;

    let mut authors = Vec::new();
    for oid in revwalk {
      let oid = oid.with_context(|| "Failed to walk history")?;
      let commit = repo
        .find_commit(oid)
        .with_context(|| format!("Failed to load commit {oid}"))?;

      if commit.parent_count() > 1 || !touches_path(&repo, &commit, &pathspec)? {
        continue;
      }

      let name = author_name(&commit, mailmap.as_ref())?;
      trace!("{} touched {} ({})", name, pathspec, oid);
      authors.push(name);
    }

    debug!("Found {} commit author(s) for {}", authors.len(), pathspec);
    Ok(authors)
  }
}

fn touches_path(repo: &Repository, commit: &Commit<'_>, pathspec: &str) -> Result<bool> {
  let tree = commit.tree().with_context(|| "Failed to get commit tree")?;
  let parent_tree = match commit.parents().next() {
    Some(parent) => Some(parent.tree().with_context(|| "Failed to get parent tree")?),
    None => None,
  };

  let mut opts = DiffOptions::new();
  opts.pathspec(pathspec).disable_pathspec_match(true);

  let diff = repo
    .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
    .with_context(|| format!("Failed to diff commit {}", commit.id()))?;

  Ok(diff.deltas().len() > 0)
}

fn author_name(commit: &Commit<'_>, mailmap: Option<&Mailmap>) -> Result<String> {
  let signature = match mailmap {
    Some(mailmap) => commit
      .author_with_mailmap(mailmap)
      .with_context(|| format!("Failed to resolve author of {}", commit.id()))?,
    None => commit.author(),
  };
  Ok(String::from_utf8_lossy(signature.name_bytes()).into_owned())
}
