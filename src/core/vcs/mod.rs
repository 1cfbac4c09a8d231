//! Git access
//!
//! Workflows talk to git through the [`Git`] trait so tests can swap in a
//! fake. [`SystemGit`] drives the system `git` binary.
//!
//! `run` is for commands that only read the repository (fetch counts as a
//! read: it only moves remote-tracking refs). Everything that changes the
//! working tree, index, local branches or the remote goes through
//! `run_write`, which a dry-run backend may skip.

pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::PathBuf;

/// Git operations consumed by the release workflows
pub trait Git {
  /// Absolute path of the working tree root
  fn repo_root(&self) -> ReleaseResult<PathBuf>;

  /// Current branch name, `HEAD` when detached
  fn current_branch(&self) -> ReleaseResult<String>;

  fn tag_exists(&self, tag: &str) -> ReleaseResult<bool>;

  fn remote_branch_exists(&self, remote: &str, branch: &str) -> ReleaseResult<bool>;

  /// No staged, unstaged or untracked changes
  fn working_tree_clean(&self) -> ReleaseResult<bool>;

  /// Run a read-only git command and return stdout
  fn run(&self, args: &[&str]) -> ReleaseResult<String>;

  /// Run a mutating git command and return stdout
  fn run_write(&self, args: &[&str]) -> ReleaseResult<String>;

  fn checkout(&self, git_ref: &str) -> ReleaseResult<()> {
    self.run_write(&["checkout", git_ref]).map(|_| ())
  }

  fn pull(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.run_write(&["pull", "--ff-only", remote, branch]).map(|_| ())
  }

  /// Create `name` at `start_point` and switch to it
  fn create_branch(&self, name: &str, start_point: &str) -> ReleaseResult<()> {
    self.run_write(&["checkout", "-b", name, start_point]).map(|_| ())
  }

  fn push_with_upstream(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.run_write(&["push", "-u", remote, branch]).map(|_| ())
  }

  fn fetch(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.run(&["fetch", remote, branch]).map(|_| ())
  }

  /// Contents of `path` at `rev`
  fn show_file(&self, rev: &str, path: &str) -> ReleaseResult<String> {
    self.run(&["show", &format!("{}:{}", rev, path)])
  }

  /// Whether `path` exists at `rev`
  fn file_exists_at(&self, rev: &str, path: &str) -> ReleaseResult<bool> {
    Ok(self.run(&["cat-file", "-e", &format!("{}:{}", rev, path)]).is_ok())
  }

  /// Paths changed between two revisions
  fn changed_paths(&self, base: &str, head: &str) -> ReleaseResult<Vec<String>> {
    let out = self.run(&["diff", "--name-only", base, head])?;
    Ok(non_empty_lines(&out))
  }

  /// Paths with unresolved merge conflicts
  fn conflicted_paths(&self) -> ReleaseResult<Vec<String>> {
    let out = self.run(&["diff", "--name-only", "--diff-filter=U"])?;
    Ok(non_empty_lines(&out))
  }
}

fn non_empty_lines(out: &str) -> Vec<String> {
  out
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(String::from)
    .collect()
}
