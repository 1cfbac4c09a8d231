//! Backport workflow: carry a trunk fix onto a release line
//!
//! The changelog is never text-merged. Entries the commit added are pulled out
//! of its diff and re-inserted into the release branch's own Unreleased
//! section, so a cherry-pick whose only conflict is the changelog still goes
//! through.

use std::fs;

use crate::changelog::{self, Entry};
use crate::core::cancel::CancelToken;
use crate::core::error::{PolicyError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::github::{GitHub, PullRequest};
use crate::core::vcs::Git;
use crate::release::component::{
  backport_branch, backport_label, parse_release_line, release_branch, short_sha,
};
use crate::release::prepare::report_pr;
use crate::release::preflight::{ensure_clean_tree, read_remote_file};
use crate::ui::Logger;
use crate::ui::prompt::{Prompter, confirm_off_trunk, require_confirmation};

/// Inputs for one backport run
#[derive(Debug, Clone)]
pub struct BackportConfig {
  pub component: String,
  pub commit: String,
  /// Target line, `vMAJOR.MINOR`
  pub line: String,
  pub changelog_path: String,
  pub trunk: String,
  pub remote: String,
  pub dry_run: bool,
  pub open: bool,
}

/// Names and entries resolved before any branch is touched
#[derive(Debug, Clone)]
pub struct BackportPlan {
  pub commit: String,
  pub short_sha: String,
  pub subject: String,
  pub major: u64,
  pub minor: u64,
  pub release_branch: String,
  pub backport_branch: String,
  pub entries: Vec<Entry>,
}

impl BackportPlan {
  pub fn commit_message(&self) -> String {
    format!(
      "Backport {}: {}\n\n(cherry picked from commit {})",
      self.short_sha, self.subject, self.commit
    )
  }

  pub fn pr_title(&self) -> String {
    format!("Backport {} to v{}.{}", self.short_sha, self.major, self.minor)
  }

  pub fn pr_body(&self) -> String {
    format!(
      "Backport of {}.\n\nOriginal commit: {}\n\nOriginal message: {}\n",
      self.short_sha, self.commit, self.subject
    )
  }
}

enum State {
  Plan,
  DryRun(BackportPlan),
  Preflight(BackportPlan),
  PrepareBranch(BackportPlan),
  Apply(BackportPlan),
  Commit(BackportPlan),
  Push(BackportPlan),
  OpenPr(BackportPlan),
  Done(Option<String>),
}

pub struct Backport<'a> {
  config: BackportConfig,
  git: &'a dyn Git,
  github: &'a dyn GitHub,
  prompter: Option<&'a dyn Prompter>,
  log: &'a dyn Logger,
  cancel: CancelToken,
}

impl<'a> Backport<'a> {
  pub fn new(
    config: BackportConfig,
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
    }
  }

  #[allow(dead_code)] // Cancellation is driven by embedding callers and tests
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
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
        ensure_clean_tree(self.git, self.log)?;
        let current = self.git.current_branch()?;
        confirm_off_trunk(
          self.prompter,
          &current,
          &self.config.trunk,
          "backport",
          &[format!(
            "Will check out {} and create {}.",
            plan.release_branch, plan.backport_branch
          )],
        )?;
        Ok(State::PrepareBranch(plan))
      }
      State::PrepareBranch(plan) => {
        self.prepare_branch(&plan)?;
        Ok(State::Apply(plan))
      }
      State::Apply(plan) => {
        self.log.step("Applying backport changes");
        if let Err(e) = self.apply(&plan) {
          self.abort_cherry_pick();
          return Err(e);
        }
        self.log_entries(&plan.entries);
        Ok(State::Commit(plan))
      }
      State::Commit(plan) => {
        let path = &self.config.changelog_path;
        self.git.run_write(&["add", "--", path]).context("stage changelog")?;
        self.git.run_write(&["commit", "-m", &plan.commit_message()])?;
        Ok(State::Push(plan))
      }
      State::Push(plan) => {
        require_confirmation(
          self.prompter,
          "push backport branch",
          &[format!(
            "Push: {} -> {}/{}",
            plan.backport_branch, self.config.remote, plan.backport_branch
          )],
        )?;
        self.log.step("Pushing backport branch");
        self.git.push_with_upstream(&self.config.remote, &plan.backport_branch)?;
        Ok(State::OpenPr(plan))
      }
      State::OpenPr(plan) => {
        let url = self.open_pr(&plan)?;
        self.log.success("Backport complete");
        self.log.info(&format!(
          "Commit {} ({}) has been backported to {}",
          plan.short_sha, plan.subject, plan.release_branch
        ));
        self.log_next_steps(&plan);
        Ok(State::Done(url))
      }
      State::Done(url) => Ok(State::Done(url)),
    }
  }

  /// Parse the target line and pull the commit's changelog entries
  pub fn plan(&self) -> ReleaseResult<BackportPlan> {
    let (major, minor) = parse_release_line(&self.config.line)?;
    let commit = self.config.commit.trim();

    self.log.step("Extracting changelog entries");
    let (subject, entries) = self.extract_entries(commit)?;
    self.log.info(&format!("Found {} changelog entries", entries.len()));

    let plan = BackportPlan {
      commit: commit.to_string(),
      short_sha: short_sha(commit).to_string(),
      subject,
      major,
      minor,
      release_branch: release_branch(&self.config.component, major, minor),
      backport_branch: backport_branch(&self.config.component, (major, minor), commit),
      entries,
    };

    self.log.step("Preparing backport");
    self.log.detail("Repo root", &self.git.repo_root()?.display().to_string());
    self.log.detail("Commit", &format!("{} ({})", plan.short_sha, plan.subject));
    self.log.detail("Release branch", &plan.release_branch);
    self.log.detail("Backport branch", &plan.backport_branch);
    Ok(plan)
  }

  /// Subject line plus the entries the commit added to the changelog
  fn extract_entries(&self, commit: &str) -> ReleaseResult<(String, Vec<Entry>)> {
    let path = &self.config.changelog_path;
    let output = self
      .git
      .run(&["show", "--format=%s", commit, "--", path])
      .context("read commit")?;

    let (subject, diff) = output.split_once('\n').unwrap_or((output.as_str(), ""));
    let entries = changelog::parse_with_diff("", diff.trim_start(), path)?.added_entries;
    if entries.is_empty() {
      return Err(
        PolicyError::NoBackportEntries {
          commit: commit.to_string(),
        }
        .into(),
      );
    }
    Ok((subject.trim().to_string(), entries))
  }

  fn report_dry_run(&self, plan: &BackportPlan) {
    self.log.info("=== DRY RUN ===");
    self.log.info(&format!("Would cherry-pick commit: {} ({})", plan.short_sha, plan.subject));
    self.log.info(&format!("Would target branch: {}", plan.release_branch));
    self.log.info(&format!("Would create backport branch: {}", plan.backport_branch));
    self.log_entries(&plan.entries);
    self.log.info(&format!("Would create commit: Backport {}: {}", plan.short_sha, plan.subject));
    self.log.info(&format!("Would push to {}/{}", self.config.remote, plan.backport_branch));
    self.log.info(&format!(
      "Would create PR: {} (base: {}, label: {})",
      plan.pr_title(),
      plan.release_branch,
      backport_label(&self.config.component)
    ));
  }

  fn log_entries(&self, entries: &[Entry]) {
    self.log.info(&format!("Changelog entries ({}):", entries.len()));
    for entry in entries {
      self.log.info(&format!("  [{}] {}", entry.category, entry.text));
    }
  }

  fn prepare_branch(&self, plan: &BackportPlan) -> ReleaseResult<()> {
    let remote = &self.config.remote;
    self.log.step("Creating backport branch");
    self.git.fetch(remote, &plan.release_branch).context("fetch release branch")?;
    self.git.checkout(&plan.release_branch).context("checkout release branch")?;
    self.git.pull(remote, &plan.release_branch).context("pull release branch")?;
    self
      .git
      .run_write(&["checkout", "-b", &plan.backport_branch])
      .context("create backport branch")?;
    Ok(())
  }

  /// Cherry-pick without committing, then rebuild the changelog from entries
  fn apply(&self, plan: &BackportPlan) -> ReleaseResult<()> {
    let path = &self.config.changelog_path;
    if let Err(e) = self.git.run_write(&["cherry-pick", "-x", "--no-commit", &plan.commit]) {
      self.resolve_changelog_conflict(e)?;
    }

    // The release branch's changelog is the base for the inserted entries
    self.git.run_write(&["checkout", "HEAD", "--", path]).context("restore changelog")?;

    let file = self.git.repo_root()?.join(path);
    let content = fs::read_to_string(&file).map_err(|e| ReleaseError::file(&file, e))?;
    let updated = changelog::parse(&content)?.insert_entries(&plan.entries)?;
    fs::write(&file, updated.render()).map_err(|e| ReleaseError::file(&file, e))?;
    Ok(())
  }

  /// Keep the release branch's changelog when it is the only conflict;
  /// any other conflict fails with the conflicted paths
  fn resolve_changelog_conflict(&self, pick_error: ReleaseError) -> ReleaseResult<()> {
    let path = &self.config.changelog_path;
    let conflicts = self.git.conflicted_paths().context("list conflicts")?;
    if conflicts.is_empty() {
      return Err(pick_error);
    }
    if conflicts.iter().any(|c| c != path) {
      return Err(PolicyError::BackportConflict { paths: conflicts }.into());
    }

    self.log.info(&format!("Resolving changelog-only conflict in {}", path));
    self.git.run_write(&["checkout", "--ours", "--", path]).context("keep release changelog")?;
    self.git.run_write(&["add", "--", path]).context("stage resolved changelog")?;
    Ok(())
  }

  /// Undo a failed pick. `--no-commit` leaves no sequencer state behind,
  /// so `--abort` can fail on a conflicted index; `reset --merge` clears it.
  fn abort_cherry_pick(&self) {
    let Err(abort) = self.git.run_write(&["cherry-pick", "--abort"]) else {
      return;
    };
    log::debug!("cherry-pick --abort failed, resetting instead: {}", abort);
    if let Err(e) = self.git.run_write(&["reset", "--merge"]) {
      self.log.error(&format!("Failed to clean up after cherry-pick: {}", e));
      self.log.error("Run `git cherry-pick --abort` or `git reset --merge` manually");
    }
  }

  fn open_pr(&self, plan: &BackportPlan) -> ReleaseResult<Option<String>> {
    let pr = PullRequest {
      title: plan.pr_title(),
      body: plan.pr_body(),
      label: backport_label(&self.config.component),
      base: plan.release_branch.clone(),
    };
    require_confirmation(
      self.prompter,
      "create GitHub PR",
      &[
        format!("Base branch: {}", pr.base),
        format!("Title: {}", pr.title),
        format!("Label: {}", pr.label),
      ],
    )?;

    self.log.step("Creating backport PR");
    let url = self.github.create_pr(&pr)?;
    report_pr(self.github, self.log, url.as_deref(), self.config.open);
    Ok(url)
  }

  fn log_next_steps(&self, plan: &BackportPlan) {
    let next = match self.next_patch_version(plan) {
      Ok(version) => version,
      Err(e) => {
        self.log.info(&format!("Note: could not infer exact next patch version from changelog: {}", e));
        format!("v{}.{}.X", plan.major, plan.minor)
      }
    };
    self.log.info("Next steps:");
    self.log.info(&format!("  1. Merge the backport PR targeting {}", plan.release_branch));
    self.log.info(&format!(
      "  2. Run: releaser prepare --component {} --version {}",
      self.config.component, next
    ));
    self.log.info("  3. Merge the release PR to trigger the release workflow");
  }

  fn next_patch_version(&self, plan: &BackportPlan) -> ReleaseResult<String> {
    let content = read_remote_file(
      self.git,
      &self.config.remote,
      &plan.release_branch,
      &self.config.changelog_path,
    )?;
    let doc = changelog::parse(&content)?;
    let latest = doc.latest_stable_for_line(plan.major, plan.minor)?;
    Ok(format!("v{}.{}.{}", plan.major, plan.minor, latest.patch() + 1))
  }
}
