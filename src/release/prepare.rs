//! Prepare workflow: open the changelog-promotion pull request
//!
//! Branch strategy follows the version shape:
//! - prerelease: PR targets trunk
//! - patch (`Z > 0`): PR targets the existing `release/<component>/vX.Y`
//! - first stable (`X.Y.0`): `release/<component>/vX.Y` is cut from trunk,
//!   then the PR targets it
//!
//! Every mutating step may be gated by a [`Prompter`]; a decline stops the run
//! and leaves what was already done in place.

use chrono::{Local, NaiveDate};
use std::fs;

use crate::changelog::{self, Changelog};
use crate::core::cancel::CancelToken;
use crate::core::error::{ChangelogError, PolicyError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::github::{GitHub, PullRequest};
use crate::core::vcs::Git;
use crate::release::component::{ReleaseTag, release_label};
use crate::release::preflight::{ensure_clean_tree, read_remote_file};
use crate::ui::Logger;
use crate::ui::prompt::{Prompter, confirm_off_trunk, require_confirmation};

/// Inputs for one prepare run
#[derive(Debug, Clone)]
pub struct PrepareConfig {
  pub component: String,
  pub version: String,
  pub changelog_path: String,
  pub trunk: String,
  pub remote: String,
  pub dry_run: bool,
  /// Open the PR in the browser afterwards
  pub open: bool,
}

/// Everything decided before the first mutation
#[derive(Debug, Clone)]
pub struct PreparePlan {
  pub tag: ReleaseTag,
  /// Branch the PR targets
  pub base_branch: String,
  /// Cut `release_branch` from trunk first
  pub create_release_branch: bool,
  pub release_branch: String,
  pub prep_branch: String,
  pub pr_title: String,
  pub pr_body: String,
  pub label: String,
  /// Rendered changelog after promotion
  pub promoted: String,
}

impl PreparePlan {
  pub fn commit_message(&self) -> String {
    format!("Release {}", self.tag.title())
  }
}

enum State {
  Plan,
  DryRun(PreparePlan),
  Preflight(PreparePlan),
  SetupBase(PreparePlan),
  CreatePrepBranch(PreparePlan, String),
  Commit(PreparePlan),
  Push(PreparePlan),
  OpenPr(PreparePlan),
  Done(Option<String>),
}

pub struct Prepare<'a> {
  config: PrepareConfig,
  git: &'a dyn Git,
  github: &'a dyn GitHub,
  prompter: Option<&'a dyn Prompter>,
  log: &'a dyn Logger,
  cancel: CancelToken,
  today: NaiveDate,
}

impl<'a> Prepare<'a> {
  pub fn new(
    config: PrepareConfig,
    git: &'a dyn Git,
    github: &'a dyn GitHub,
    prompter: Option<&'a dyn Prompter>,
    log: &'a dyn Logger,
  ) -> Self {
    Self {
      config,
      git,
      github,
      prompter,
      log,
      cancel: CancelToken::new(),
      today: Local::now().date_naive(),
    }
  }

  #[allow(dead_code)] // Cancellation is driven by embedding callers and tests
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  /// Release date written into the promoted section
  #[allow(dead_code)] // Fixed dates for tests
  pub fn with_date(mut self, today: NaiveDate) -> Self {
    self.today = today;
    self
  }

  /// Run to completion; returns the PR URL when one was created and known
  pub fn run(&self) -> ReleaseResult<Option<String>> {
    let mut state = State::Plan;
    loop {
      if let State::Done(url) = state {
        return Ok(url);
      }
      self.cancel.check()?;
      state = self.advance(state)?;
    }
  }

  fn advance(&self, state: State) -> ReleaseResult<State> {
    match state {
      State::Plan => {
        let plan = self.plan()?;
        Ok(if self.config.dry_run {
          State::DryRun(plan)
        } else {
          State::Preflight(plan)
        })
      }
      State::DryRun(plan) => {
        self.report_dry_run(&plan);
        Ok(State::Done(None))
      }
      State::Preflight(plan) => {
        self.preflight(&plan)?;
        Ok(State::SetupBase(plan))
      }
      State::SetupBase(plan) => {
        let base_ref = self.setup_base(&plan)?;
        Ok(State::CreatePrepBranch(plan, base_ref))
      }
      State::CreatePrepBranch(plan, base_ref) => {
        self.log.step("Creating prep branch");
        self
          .git
          .create_branch(&plan.prep_branch, &base_ref)
          .context("create prep branch")?;
        Ok(State::Commit(plan))
      }
      State::Commit(plan) => {
        self.commit(&plan)?;
        Ok(State::Push(plan))
      }
      State::Push(plan) => {
        require_confirmation(
          self.prompter,
          "push prep branch",
          &[format!(
            "Push: {} -> {}/{}",
            plan.prep_branch, self.config.remote, plan.prep_branch
          )],
        )?;
        self.log.step("Pushing prep branch");
        self.git.push_with_upstream(&self.config.remote, &plan.prep_branch)?;
        Ok(State::OpenPr(plan))
      }
      State::OpenPr(plan) => self.open_pr(&plan).map(State::Done),
      State::Done(url) => Ok(State::Done(url)),
    }
  }

  /// Resolve branches, read the source changelog, promote it
  pub fn plan(&self) -> ReleaseResult<PreparePlan> {
    self.log.step(&format!("Preparing release PR for {}", self.config.component));
    let current = self.git.current_branch()?;
    self.log.detail("Current branch", &current);
    self.log.detail("Repo root", &self.git.repo_root()?.display().to_string());

    let tag = ReleaseTag::parse(&self.config.component, &self.config.version)?;
    let release_branch = tag.release_branch();
    let (base_branch, create_release_branch) = self.branch_strategy(&tag, &release_branch)?;

    // A new release line starts from trunk's changelog
    let source = if create_release_branch {
      &self.config.trunk
    } else {
      &base_branch
    };
    let content = read_remote_file(self.git, &self.config.remote, source, &self.config.changelog_path)
      .context("read changelog")?;
    let doc = changelog::parse(&content)?;

    let version = tag.version.to_string();
    if doc.has_version(&version) {
      return Err(ChangelogError::VersionExists { version }.into());
    }
    let promoted = doc.promote(&version, self.today)?;

    let plan = PreparePlan {
      pr_title: format!("chore: release {}", tag.title()),
      pr_body: pr_body(&version, &promoted)?,
      label: release_label(&tag.component),
      prep_branch: tag.prep_branch(),
      promoted: promoted.render(),
      tag,
      base_branch,
      create_release_branch,
      release_branch,
    };

    self.log.detail("Prep branch", &plan.prep_branch);
    self.log.detail("Base branch", &plan.base_branch);
    if plan.create_release_branch {
      self.log.detail("Release branch", &plan.release_branch);
    }
    Ok(plan)
  }

  fn branch_strategy(&self, tag: &ReleaseTag, release_branch: &str) -> ReleaseResult<(String, bool)> {
    if tag.is_prerelease() {
      return Ok((self.config.trunk.clone(), false));
    }

    let exists = self.git.remote_branch_exists(&self.config.remote, release_branch)?;
    if tag.version.patch() > 0 {
      if !exists {
        return Err(
          PolicyError::ReleaseBranchMissing {
            branch: release_branch.to_string(),
          }
          .into(),
        );
      }
      return Ok((release_branch.to_string(), false));
    }

    if exists {
      return Err(
        PolicyError::ReleaseBranchExists {
          branch: release_branch.to_string(),
        }
        .into(),
      );
    }
    Ok((release_branch.to_string(), true))
  }

  fn report_dry_run(&self, plan: &PreparePlan) {
    self.log.info("=== DRY RUN ===");
    if plan.create_release_branch {
      self.log.info(&format!("Would create release branch: {}", plan.release_branch));
    }
    self.log.info(&format!("Would create prep branch: {}", plan.prep_branch));
    self.log.info(&format!("Would promote changelog to: [{}]", plan.tag.version.num()));
    self.log.info(&format!("Would create PR targeting: {}", plan.base_branch));
    self.log.info(&format!("Would set PR title: {}", plan.pr_title));
    self.log.info(&format!("Would add label: {}", plan.label));
    self.log_promoted(&plan.promoted);
  }

  fn log_promoted(&self, promoted: &str) {
    self.log.info("Promoted changelog:");
    for line in promoted.trim_end_matches('\n').lines() {
      self.log.info(&format!("  {}", line));
    }
  }

  fn preflight(&self, plan: &PreparePlan) -> ReleaseResult<()> {
    ensure_clean_tree(self.git, self.log)?;

    let source = if plan.create_release_branch {
      &self.config.trunk
    } else {
      &plan.base_branch
    };
    let current = self.git.current_branch()?;
    confirm_off_trunk(
      self.prompter,
      &current,
      &self.config.trunk,
      "prepare",
      &[
        format!(
          "Will create and switch to new working branches from latest {}/{}.",
          self.config.remote, source
        ),
        "This changes your current branch context; cancel if you do not want to branch right now.".to_string(),
      ],
    )
  }

  /// Fetch the base, cutting the release branch when needed; returns the
  /// ref the prep branch starts from
  fn setup_base(&self, plan: &PreparePlan) -> ReleaseResult<String> {
    let remote = &self.config.remote;
    if !plan.create_release_branch {
      self.git.fetch(remote, &plan.base_branch).context("fetch base branch")?;
      return Ok(format!("{}/{}", remote, plan.base_branch));
    }

    let trunk = &self.config.trunk;
    self.git.fetch(remote, trunk).context("fetch trunk")?;
    require_confirmation(
      self.prompter,
      "create and push release branch",
      &[
        format!("Source branch: {}", trunk),
        format!("New branch: {}", plan.release_branch),
        format!("Push: {} -> {}/{}", plan.release_branch, remote, plan.release_branch),
      ],
    )?;

    self.log.step("Creating release branch");
    self.log.info(&format!(
      "Creating release branch {} from {}/{}...",
      plan.release_branch, remote, trunk
    ));
    self
      .git
      .create_branch(&plan.release_branch, &format!("{}/{}", remote, trunk))
      .context("create release branch")?;
    self.git.push_with_upstream(remote, &plan.release_branch)?;
    Ok(plan.release_branch.clone())
  }

  fn commit(&self, plan: &PreparePlan) -> ReleaseResult<()> {
    let path = &self.config.changelog_path;
    let message = plan.commit_message();
    require_confirmation(
      self.prompter,
      "promote changelog and create commit",
      &[
        format!("Branch: {}", plan.prep_branch),
        format!("File: {}", path),
        format!("Version: {}", plan.tag.version),
        format!("Commit message: {}", message),
      ],
    )?;

    self.log.step("Updating changelog");
    let file = self.git.repo_root()?.join(path);
    fs::write(&file, &plan.promoted).map_err(|e| ReleaseError::file(&file, e))?;
    self.log_promoted(&plan.promoted);

    self.log.step("Committing changelog");
    self.git.run_write(&["add", "--", path])?;
    self.git.run_write(&["commit", "-m", &message])?;
    Ok(())
  }

  fn open_pr(&self, plan: &PreparePlan) -> ReleaseResult<Option<String>> {
    let mut details = vec![
      format!("Base branch: {}", plan.base_branch),
      format!("Title: {}", plan.pr_title),
      format!("Label: {}", plan.label),
      "Body:".to_string(),
    ];
    details.extend(plan.pr_body.lines().map(String::from));
    require_confirmation(self.prompter, "create GitHub PR", &details)?;

    self.log.step("Creating release PR");
    let url = self.github.create_pr(&PullRequest {
      title: plan.pr_title.clone(),
      body: plan.pr_body.clone(),
      label: plan.label.clone(),
      base: plan.base_branch.clone(),
    })?;
    report_pr(self.github, self.log, url.as_deref(), self.config.open);

    self.log.success("Release PR created successfully");
    self.log.info(&format!("Target branch: {}", plan.base_branch));
    self.log.info("Once the PR is merged, the release workflow will trigger automatically.");
    Ok(url)
  }
}

/// Log the PR URL and optionally open it; failures here never fail the run
pub(crate) fn report_pr(github: &dyn GitHub, log: &dyn Logger, url: Option<&str>, open: bool) {
  match url {
    Some(url) => log.info(&format!("PR: {}", url)),
    None => log.warn("PR created, but URL could not be determined"),
  }
  if !open {
    return;
  }
  match url {
    Some(url) => {
      if let Err(e) = github.open_pr(url) {
        log.warn(&format!("Could not open PR in browser: {}", e));
      }
    }
    None => log.warn(&format!(
      "Could not open PR in browser: {}",
      crate::core::error::GitHubError::MissingPrUrl
    )),
  }
}

/// One `- [Category] text` line per entry of the new section
fn pr_body(version: &str, promoted: &Changelog) -> ReleaseResult<String> {
  let section = promoted.get_version(version).ok_or_else(|| ChangelogError::VersionNotFound {
    version: version.to_string(),
  })?;

  let mut body = format!("## Description\n\nPrepare release {}\n\n", version);
  let mut count = 0;
  for entry in section.entries() {
    body.push_str(&format!("- [{}] {}\n", entry.category, entry.text));
    count += 1;
  }
  if count == 0 {
    body.push_str("- No changelog entries found\n");
  }
  Ok(body.trim_end_matches('\n').to_string())
}
