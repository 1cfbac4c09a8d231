//! In-memory collaborators for workflow tests

use crate::changelog::Version;
use crate::core::error::{GitError, ReleaseError, ReleaseResult};
use crate::core::github::{GitHub, PullRequest, ReleaseRequest};
use crate::core::vcs::Git;
use crate::release::builder::Builder;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Scriptable [`Git`] that records every command
#[derive(Default)]
pub struct FakeGit {
  pub root: PathBuf,
  pub branch: RefCell<String>,
  pub tags: Vec<String>,
  pub remote_branches: Vec<String>,
  pub dirty: bool,
  /// `rev:path` -> content, served by `git show`
  pub files: HashMap<String, String>,
  /// Full read command -> output, for anything other than `show rev:path`
  pub outputs: HashMap<String, String>,
  /// Write commands starting with this text fail
  pub fail_on: Option<String>,
  pub reads: RefCell<Vec<String>>,
  pub writes: RefCell<Vec<String>>,
}

impl FakeGit {
  pub fn new(root: &Path, branch: &str) -> Self {
    Self {
      root: root.to_path_buf(),
      branch: RefCell::new(branch.to_string()),
      ..Default::default()
    }
  }

  pub fn with_file(mut self, rev: &str, path: &str, content: &str) -> Self {
    self.files.insert(format!("{}:{}", rev, path), content.to_string());
    self
  }

  pub fn with_output(mut self, command: &str, output: &str) -> Self {
    self.outputs.insert(command.to_string(), output.to_string());
    self
  }

  pub fn wrote(&self, command: &str) -> bool {
    self.writes.borrow().iter().any(|w| w == command)
  }

  fn failed(command: &str) -> ReleaseError {
    ReleaseError::Git(GitError::CommandFailed {
      command: format!("git {}", command),
      stderr: "fake failure".to_string(),
    })
  }
}

impl Git for FakeGit {
  fn repo_root(&self) -> ReleaseResult<PathBuf> {
    Ok(self.root.clone())
  }

  fn current_branch(&self) -> ReleaseResult<String> {
    Ok(self.branch.borrow().clone())
  }

  fn tag_exists(&self, tag: &str) -> ReleaseResult<bool> {
    Ok(self.tags.iter().any(|t| t == tag))
  }

  fn remote_branch_exists(&self, _remote: &str, branch: &str) -> ReleaseResult<bool> {
    Ok(self.remote_branches.iter().any(|b| b == branch))
  }

  fn working_tree_clean(&self) -> ReleaseResult<bool> {
    Ok(!self.dirty)
  }

  fn run(&self, args: &[&str]) -> ReleaseResult<String> {
    let command = args.join(" ");
    self.reads.borrow_mut().push(command.clone());
    match args {
      ["show", object] => self.files.get(*object).cloned().ok_or_else(|| Self::failed(&command)),
      ["cat-file", "-e", object] if !self.files.contains_key(*object) => Err(Self::failed(&command)),
      _ => Ok(self.outputs.get(&command).cloned().unwrap_or_default()),
    }
  }

  fn run_write(&self, args: &[&str]) -> ReleaseResult<String> {
    let command = args.join(" ");
    self.writes.borrow_mut().push(command.clone());
    if self.fail_on.as_deref().is_some_and(|f| command.starts_with(f)) {
      return Err(Self::failed(&command));
    }
    match args {
      ["checkout", "-b", name, ..] => *self.branch.borrow_mut() = name.to_string(),
      ["checkout", name] => *self.branch.borrow_mut() = name.to_string(),
      _ => {}
    }
    Ok(String::new())
  }
}

/// Records releases and pull requests instead of calling GitHub
#[derive(Default)]
pub struct FakeGitHub {
  pub url: Option<String>,
  pub releases: RefCell<Vec<ReleaseRequest>>,
  pub prs: RefCell<Vec<PullRequest>>,
  pub opened: RefCell<Vec<String>>,
}

impl GitHub for FakeGitHub {
  fn create_release(&self, request: &ReleaseRequest) -> ReleaseResult<()> {
    self.releases.borrow_mut().push(request.clone());
    Ok(())
  }

  fn create_pr(&self, pr: &PullRequest) -> ReleaseResult<Option<String>> {
    self.prs.borrow_mut().push(pr.clone());
    Ok(self.url.clone())
  }

  fn open_pr(&self, url: &str) -> ReleaseResult<()> {
    self.opened.borrow_mut().push(url.to_string());
    Ok(())
  }
}

/// Writes one artifact per build
#[derive(Default)]
pub struct FakeBuilder {
  pub builds: RefCell<Vec<String>>,
}

impl Builder for FakeBuilder {
  fn build(&self, version: &Version, output_dir: &Path) -> ReleaseResult<Vec<PathBuf>> {
    self.builds.borrow_mut().push(version.to_string());
    let artifact = output_dir.join(format!("tool-{}.tar.gz", version));
    fs::write(&artifact, "binary")?;
    Ok(vec![artifact])
  }
}
