//! `Git` trait implementation for SystemGit

use super::Git;
use super::system_git::SystemGit;
use crate::core::error::ReleaseResult;
use std::path::PathBuf;

impl Git for SystemGit {
  fn repo_root(&self) -> ReleaseResult<PathBuf> {
    Ok(self.work_tree.clone())
  }

  fn current_branch(&self) -> ReleaseResult<String> {
    let output = self.exec(&["rev-parse", "--abbrev-ref", "HEAD"])?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD or unborn branch
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn tag_exists(&self, tag: &str) -> ReleaseResult<bool> {
    let refname = format!("refs/tags/{}", tag);
    let output = self.exec(&["rev-parse", "--verify", "--quiet", &refname])?;
    Ok(output.status.success())
  }

  /// Asks the remote directly so a stale remote-tracking ref can't lie
  fn remote_branch_exists(&self, remote: &str, branch: &str) -> ReleaseResult<bool> {
    let refname = format!("refs/heads/{}", branch);
    let out = self.exec_checked(&["ls-remote", "--heads", remote, &refname])?;
    Ok(!out.trim().is_empty())
  }

  fn working_tree_clean(&self) -> ReleaseResult<bool> {
    let out = self.exec_checked(&["status", "--porcelain"])?;
    Ok(out.trim().is_empty())
  }

  fn run(&self, args: &[&str]) -> ReleaseResult<String> {
    self.exec_checked(args)
  }

  fn run_write(&self, args: &[&str]) -> ReleaseResult<String> {
    if self.dry_run {
      log::info!("(dry-run) git {}", args.join(" "));
      return Ok(String::new());
    }
    self.exec_checked(args)
  }
}
