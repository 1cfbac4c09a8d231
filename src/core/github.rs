//! GitHub access through the `gh` CLI
//!
//! Release creation and pull requests are the only GitHub calls the
//! workflows make. `gh` creates the tag at the target branch when it does not
//! exist yet, so no tag is ever pushed by hand.

use crate::core::error::{GitHubError, ReleaseError, ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Arguments for `gh release create`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseRequest {
  pub tag: String,
  pub title: String,
  pub notes_file: Option<PathBuf>,
  /// Branch the tag is created on when missing
  pub target: String,
  pub assets: Vec<PathBuf>,
  pub draft: bool,
  pub prerelease: bool,
  /// Refuse to publish when nothing changed since the previous release
  pub fail_on_no_commits: bool,
}

/// Arguments for `gh pr create`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
  pub title: String,
  pub body: String,
  pub label: String,
  pub base: String,
}

/// GitHub operations consumed by the release workflows
pub trait GitHub {
  fn create_release(&self, request: &ReleaseRequest) -> ReleaseResult<()>;

  /// Open a pull request for the current branch
  ///
  /// Returns the PR URL when it could be determined.
  fn create_pr(&self, pr: &PullRequest) -> ReleaseResult<Option<String>>;

  /// Show a pull request in the browser
  fn open_pr(&self, url: &str) -> ReleaseResult<()>;
}

/// [`GitHub`] backed by the `gh` executable
pub struct GhCli {
  program: String,
  workdir: PathBuf,
  dry_run: bool,
}

impl GhCli {
  pub fn new(program: impl Into<String>, workdir: &Path) -> Self {
    Self {
      program: program.into(),
      workdir: workdir.to_path_buf(),
      dry_run: false,
    }
  }

  /// Log mutating commands instead of running them
  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  fn exec(&self, args: &[String]) -> ReleaseResult<Output> {
    log::debug!("{} {}", self.program, args.join(" "));
    Command::new(&self.program)
      .current_dir(&self.workdir)
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {} {}", self.program, args.join(" ")))
  }

  fn run_read(&self, args: &[String]) -> ReleaseResult<String> {
    let output = self.exec(args)?;
    if !output.status.success() {
      return Err(ReleaseError::GitHub(GitHubError::CommandFailed {
        command: format!("{} {}", self.program, args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Returns `None` when skipped by dry-run
  fn run_write(&self, args: &[String]) -> ReleaseResult<Option<String>> {
    if self.dry_run {
      log::info!("(dry-run) {} {}", self.program, args.join(" "));
      return Ok(None);
    }
    self.run_read(args).map(Some)
  }
}

impl GitHub for GhCli {
  fn create_release(&self, request: &ReleaseRequest) -> ReleaseResult<()> {
    self.run_write(&release_args(request)).map(|_| ())
  }

  fn create_pr(&self, pr: &PullRequest) -> ReleaseResult<Option<String>> {
    let Some(output) = self.run_write(&pr_args(pr))? else {
      return Ok(None);
    };

    if let Some(url) = extract_pr_url(&output) {
      return Ok(Some(url));
    }

    let fallback = ["pr", "view", "--json", "url", "--jq", ".url"].map(String::from);
    match self.run_read(&fallback) {
      Ok(url) if !url.is_empty() => Ok(Some(url)),
      Ok(_) => Ok(None),
      Err(e) => {
        log::warn!("could not determine PR URL from gh output: {}", e);
        Ok(None)
      }
    }
  }

  fn open_pr(&self, url: &str) -> ReleaseResult<()> {
    self.run_read(&["pr", "view", "--web", url].map(String::from)).map(|_| ())
  }
}

/// Command line for `gh release create`
pub fn release_args(request: &ReleaseRequest) -> Vec<String> {
  let mut args = vec!["release".to_string(), "create".to_string(), request.tag.clone()];

  if !request.title.is_empty() {
    args.extend(["--title".to_string(), request.title.clone()]);
  }
  if let Some(notes) = &request.notes_file {
    args.extend(["--notes-file".to_string(), notes.display().to_string()]);
  }
  if !request.target.is_empty() {
    args.extend(["--target".to_string(), request.target.clone()]);
  }
  if request.draft {
    args.push("--draft".to_string());
  }
  if request.prerelease {
    args.push("--prerelease".to_string());
  }
  if request.fail_on_no_commits {
    args.push("--fail-on-no-commits".to_string());
  }
  args.extend(request.assets.iter().map(|a| a.display().to_string()));

  args
}

/// Command line for `gh pr create`
pub fn pr_args(pr: &PullRequest) -> Vec<String> {
  let mut args = vec!["pr".to_string(), "create".to_string()];
  for (flag, value) in [
    ("--title", &pr.title),
    ("--body", &pr.body),
    ("--label", &pr.label),
    ("--base", &pr.base),
  ] {
    if !value.is_empty() {
      args.extend([flag.to_string(), value.clone()]);
    }
  }
  args
}

/// First http(s) token in gh output, without trailing punctuation
pub fn extract_pr_url(output: &str) -> Option<String> {
  output
    .split_whitespace()
    .find(|t| t.starts_with("https://") || t.starts_with("http://"))
    .map(|t| t.trim_end_matches(['.', ',', ')', ';']).to_string())
}
