//! Release workflow: publish a changelog section as a GitHub release
//!
//! Runs as a state machine. Each state is a hard gate and the first failure
//! aborts the run; nothing is retried. Cancellation is checked before every
//! transition.
//!
//! ```text
//! ParseTag -> CheckTag -> EnforceRefPolicy -> ValidateChangelog
//!          -> PrepareOutput -> Build -> Publish -> Summary -> Done
//! ```
//!
//! Dry-run performs every step up to and including the artifact build, then
//! only reports what the GitHub release would look like.

use std::fs;
use std::path::PathBuf;

use crate::changelog::{self, Changelog};
use crate::core::cancel::CancelToken;
use crate::core::error::{PolicyError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::github::{GitHub, ReleaseRequest};
use crate::core::vcs::Git;
use crate::release::builder::Builder;
use crate::release::component::{RELEASE_NOTES_FILE, ReleaseTag};
use crate::release::fs::{clean_dir, ensure_dir, list_files};
use crate::release::preflight::{ensure_clean_tree, read_remote_file};
use crate::ui::Logger;

/// Inputs for one release run
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
  pub component: String,
  /// Version to release, `v1.2.3` or `1.2.3`
  pub version: String,
  /// Changelog path relative to the repository root
  pub changelog_path: String,
  /// Absolute, already checked to lie inside the repository
  pub output_dir: PathBuf,
  pub trunk: String,
  pub remote: String,
  pub dry_run: bool,
  pub draft: bool,
  /// Ignore which branch the run starts from (unsafe)
  pub skip_branch_check: bool,
}

/// Where the release changelog is read from
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChangelogSource {
  WorkingTree,
  /// Dry-run skipped the checkout; read the branch tip instead
  RemoteBranch(String),
}

enum State {
  ParseTag,
  CheckTag(ReleaseTag),
  EnforceRefPolicy(ReleaseTag),
  ValidateChangelog(ReleaseTag, ChangelogSource),
  PrepareOutput(ReleaseTag, Changelog),
  Build(ReleaseTag, Changelog),
  Publish(ReleaseTag, Changelog),
  Summary(ReleaseTag),
  Done,
}

pub struct Workflow<'a> {
  config: WorkflowConfig,
  git: &'a dyn Git,
  github: &'a dyn GitHub,
  builder: Option<&'a dyn Builder>,
  log: &'a dyn Logger,
  cancel: CancelToken,
}

impl<'a> Workflow<'a> {
  pub fn new(
    config: WorkflowConfig,
    git: &'a dyn Git,
    github: &'a dyn GitHub,
    builder: Option<&'a dyn Builder>,
    log: &'a dyn Logger,
  ) -> Self {
    Self {
      config,
      git,
      github,
      builder,
      log,
      cancel: CancelToken::new(),
    }
  }

  #[allow(dead_code)] // Cancellation is driven by embedding callers and tests
  pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
    self.cancel = cancel;
    self
  }

  /// Drive the state machine to completion
  pub fn run(&self) -> ReleaseResult<()> {
    let mut state = State::ParseTag;
    while !matches!(state, State::Done) {
      self.cancel.check()?;
      state = self.advance(state)?;
    }
    Ok(())
  }

  fn advance(&self, state: State) -> ReleaseResult<State> {
    match state {
      State::ParseTag => self.parse_tag().map(State::CheckTag),
      State::CheckTag(tag) => {
        self.check_tag(&tag)?;
        Ok(State::EnforceRefPolicy(tag))
      }
      State::EnforceRefPolicy(tag) => {
        let source = self.enforce_ref_policy(&tag)?;
        Ok(State::ValidateChangelog(tag, source))
      }
      State::ValidateChangelog(tag, source) => {
        let doc = self.validate_changelog(&tag, &source)?;
        Ok(State::PrepareOutput(tag, doc))
      }
      State::PrepareOutput(tag, doc) => {
        self.prepare_output()?;
        Ok(State::Build(tag, doc))
      }
      State::Build(tag, doc) => {
        self.build(&tag)?;
        Ok(State::Publish(tag, doc))
      }
      State::Publish(tag, doc) => {
        self.publish(&tag, &doc)?;
        Ok(State::Summary(tag))
      }
      State::Summary(tag) => {
        self.summary(&tag);
        Ok(State::Done)
      }
      State::Done => Ok(State::Done),
    }
  }

  fn parse_tag(&self) -> ReleaseResult<ReleaseTag> {
    self.log.step("Validating version format");
    let tag = ReleaseTag::parse(&self.config.component, &self.config.version)?;
    self.log.detail("Tag", &tag.full());
    self.log.detail("Version", &tag.version.to_string());
    self.log.detail("Release branch", &tag.release_branch());
    self.log.detail("Prerelease", &tag.is_prerelease().to_string());
    Ok(tag)
  }

  fn check_tag(&self, tag: &ReleaseTag) -> ReleaseResult<()> {
    self.log.step("Checking tag does not exist");
    let full = tag.full();
    if self.git.tag_exists(&full)? {
      self.log.error(&format!("Tag {} already exists. Create a new patch version instead.", full));
      return Err(PolicyError::TagExists { tag: full }.into());
    }
    self.log.success("Tag does not exist");
    Ok(())
  }

  fn enforce_ref_policy(&self, tag: &ReleaseTag) -> ReleaseResult<ChangelogSource> {
    self.log.step("Enforcing ref policy");
    let current = self.git.current_branch()?;
    self.log.detail("Current branch", &current);

    if tag.is_prerelease() {
      self.enforce_prerelease_policy(&current)?;
      return Ok(ChangelogSource::WorkingTree);
    }
    self.enforce_stable_policy(tag, &current)
  }

  fn enforce_prerelease_policy(&self, current: &str) -> ReleaseResult<()> {
    let trunk = &self.config.trunk;
    if current == trunk {
      self.log.success(&format!("Prerelease release from {} branch", trunk));
      return Ok(());
    }
    if self.config.skip_branch_check {
      self.log.warn(&format!("(skip-branch-check) Ignoring branch requirement, on {}", current));
      return Ok(());
    }
    self.log.error(&format!("Prerelease versions must be triggered from {}", trunk));
    Err(
      PolicyError::WrongBranch {
        expected: trunk.clone(),
        actual: current.to_string(),
      }
      .into(),
    )
  }

  fn enforce_stable_policy(&self, tag: &ReleaseTag, current: &str) -> ReleaseResult<ChangelogSource> {
    let release_branch = tag.release_branch();
    if !self.git.remote_branch_exists(&self.config.remote, &release_branch)? {
      self.log.error(&format!(
        "Release branch {} does not exist for stable release {}",
        release_branch, tag.version
      ));
      return Err(PolicyError::ReleaseBranchMissing { branch: release_branch }.into());
    }
    self.log.detail("Release branch exists", &release_branch);

    if current == release_branch {
      self.log.success("Using release branch");
      return Ok(ChangelogSource::WorkingTree);
    }
    if self.config.skip_branch_check {
      self.log.warn(&format!("(skip-branch-check) Ignoring branch requirement, on {}", current));
      return Ok(ChangelogSource::WorkingTree);
    }

    ensure_clean_tree(self.git, self.log)?;

    self.log.info("Checking out release branch");
    self.git.checkout(&release_branch).context("checkout release branch")?;
    self.git.pull(&self.config.remote, &release_branch).context("pull release branch")?;
    self.log.success("Using release branch");

    if self.config.dry_run {
      Ok(ChangelogSource::RemoteBranch(release_branch))
    } else {
      Ok(ChangelogSource::WorkingTree)
    }
  }

  fn validate_changelog(&self, tag: &ReleaseTag, source: &ChangelogSource) -> ReleaseResult<Changelog> {
    self.log.step("Validating changelog");
    let path = &self.config.changelog_path;

    let content = match source {
      ChangelogSource::WorkingTree => {
        let file = self.git.repo_root()?.join(path);
        fs::read_to_string(&file).map_err(|e| ReleaseError::file(&file, e))?
      }
      ChangelogSource::RemoteBranch(branch) => read_remote_file(self.git, &self.config.remote, branch, path)?,
    };
    let doc = changelog::parse(&content)?;

    let version = tag.version.to_string();
    if !doc.has_version(&version) {
      self.log.error(&format!("Changelog section [{}] not found", tag.version.num()));
      self.log.error("Create a PR to promote [Unreleased] before releasing");
      return Err(
        PolicyError::ChangelogSectionMissing {
          component: tag.component.clone(),
          version,
          path: path.clone(),
        }
        .into(),
      );
    }

    self.log.success("Changelog section found");
    Ok(doc)
  }

  fn prepare_output(&self) -> ReleaseResult<()> {
    self.log.step("Preparing output directory");
    clean_dir(&self.config.output_dir)?;
    self.log.success("Output directory is ready");
    Ok(())
  }

  fn build(&self, tag: &ReleaseTag) -> ReleaseResult<()> {
    self.log.step("Building release artifacts");
    let Some(builder) = self.builder else {
      self.log.info("Component has no builder - creating changelog-only release");
      return Ok(());
    };

    let artifacts = builder.build(&tag.version, &self.config.output_dir)?;
    self.log.success(&format!("Built {} artifacts successfully", artifacts.len()));
    Ok(())
  }

  fn publish(&self, tag: &ReleaseTag, doc: &Changelog) -> ReleaseResult<()> {
    self.log.step("Creating GitHub release");

    let notes = doc.extract_notes(&tag.version.to_string())?;
    self.log.info("Release notes:");
    for line in notes.lines() {
      self.log.info(&format!("  {}", line));
    }

    let output_dir = &self.config.output_dir;
    ensure_dir(output_dir)?;
    let notes_file = output_dir.join(RELEASE_NOTES_FILE);
    fs::write(&notes_file, &notes).map_err(|e| ReleaseError::file(&notes_file, e))?;

    let assets: Vec<PathBuf> = list_files(output_dir)?
      .into_iter()
      .filter(|p| p.file_name().is_none_or(|n| n != RELEASE_NOTES_FILE))
      .collect();

    let request = ReleaseRequest {
      tag: tag.full(),
      title: tag.title(),
      notes_file: Some(notes_file),
      target: self.target_branch(tag),
      assets,
      draft: self.config.draft,
      prerelease: tag.is_prerelease(),
      fail_on_no_commits: true,
    };

    self.log.info(&format!("Creating release with {} assets...", request.assets.len()));
    self.log.detail("Target branch", &request.target);

    if self.config.dry_run {
      self.log.info("(dry-run) Would create release:");
      self.log.detail("Tag", &request.tag);
      self.log.detail("Title", &request.title);
      self.log.detail("Draft", &request.draft.to_string());
      self.log.detail("Prerelease", &request.prerelease.to_string());
      for asset in &request.assets {
        if let Some(name) = asset.file_name() {
          self.log.info(&format!("  Asset: {}", name.to_string_lossy()));
        }
      }
      return Ok(());
    }

    self.github.create_release(&request)?;
    self.log.success("GitHub release created");
    Ok(())
  }

  /// Prereleases tag trunk, stable releases tag their release branch
  fn target_branch(&self, tag: &ReleaseTag) -> String {
    if tag.is_prerelease() {
      self.config.trunk.clone()
    } else {
      tag.release_branch()
    }
  }

  fn summary(&self, tag: &ReleaseTag) {
    self.log.step("Release Summary");
    self.log.detail("Component", &tag.component);
    self.log.detail("Tag", &tag.full());
    self.log.detail("Version", &tag.version.to_string());
    self.log.detail("Prerelease", &tag.is_prerelease().to_string());
    self.log.detail("Draft", &self.config.draft.to_string());
    self.log.detail("Dry run", &self.config.dry_run.to_string());

    if self.config.dry_run {
      self.log.info("Dry run completed - no changes were made");
    } else {
      self.log.success("Release workflow completed successfully!");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::error::ErrorKind;
  use crate::release::testing::{FakeBuilder, FakeGit, FakeGitHub};
  use crate::ui::logger::testing::MemoryLogger;
  use std::path::Path;

  const CHANGELOG_PATH: &str = "src/cli/CHANGELOG.md";

  const CHANGELOG: &str = "\
# Changelog

## [Unreleased]

## [1.2.0] - 2025-05-01

### Added

- Stable feature

## [1.2.0-preview.1] - 2025-04-20

### Added

- Preview feature
";

  fn repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/cli")).unwrap();
    fs::write(dir.path().join(CHANGELOG_PATH), CHANGELOG).unwrap();
    dir
  }

  fn config(root: &Path, version: &str) -> WorkflowConfig {
    WorkflowConfig {
      component: "studioctl".to_string(),
      version: version.to_string(),
      changelog_path: CHANGELOG_PATH.to_string(),
      output_dir: root.join("build/release"),
      trunk: "main".to_string(),
      remote: "origin".to_string(),
      dry_run: false,
      draft: true,
      skip_branch_check: false,
    }
  }

  #[test]
  fn test_prerelease_from_trunk_publishes_to_trunk() {
    let dir = repo();
    let git = FakeGit::new(dir.path(), "main");
    let gh = FakeGitHub::default();
    let builder = FakeBuilder::default();
    let log = MemoryLogger::default();

    Workflow::new(config(dir.path(), "v1.2.0-preview.1"), &git, &gh, Some(&builder), &log)
      .run()
      .unwrap();

    let releases = gh.releases.borrow();
    assert_eq!(releases.len(), 1);
    let release = &releases[0];
    assert_eq!(release.tag, "studioctl/v1.2.0-preview.1");
    assert_eq!(release.title, "studioctl v1.2.0-preview.1");
    assert_eq!(release.target, "main");
    assert!(release.prerelease && release.draft && release.fail_on_no_commits);
    assert_eq!(release.assets.len(), 1);
    assert!(release.assets[0].ends_with("tool-v1.2.0-preview.1.tar.gz"));

    let notes = fs::read_to_string(dir.path().join("build/release").join(RELEASE_NOTES_FILE)).unwrap();
    assert_eq!(notes, "### Added\n- Preview feature");
    assert_eq!(
      log.steps(),
      [
        "Validating version format",
        "Checking tag does not exist",
        "Enforcing ref policy",
        "Validating changelog",
        "Preparing output directory",
        "Building release artifacts",
        "Creating GitHub release",
        "Release Summary",
      ]
    );
  }

  #[test]
  fn test_existing_tag_aborts_before_any_mutation() {
    let dir = repo();
    let mut git = FakeGit::new(dir.path(), "main");
    git.tags.push("studioctl/v1.2.0-preview.1".to_string());
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    let err = Workflow::new(config(dir.path(), "v1.2.0-preview.1"), &git, &gh, None, &log)
      .run()
      .unwrap_err();
    assert!(matches!(err, ReleaseError::Policy(PolicyError::TagExists { .. })));
    assert!(git.writes.borrow().is_empty());
    assert!(!dir.path().join("build/release").exists());
  }

  #[test]
  fn test_prerelease_off_trunk_fails_unless_skipped() {
    let dir = repo();
    let git = FakeGit::new(dir.path(), "feature/x");
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    let err = Workflow::new(config(dir.path(), "v1.2.0-preview.1"), &git, &gh, None, &log)
      .run()
      .unwrap_err();
    assert!(matches!(err, ReleaseError::Policy(PolicyError::WrongBranch { .. })));

    let mut cfg = config(dir.path(), "v1.2.0-preview.1");
    cfg.skip_branch_check = true;
    Workflow::new(cfg, &git, &gh, None, &log).run().unwrap();
    assert_eq!(gh.releases.borrow().len(), 1);
  }

  #[test]
  fn test_stable_requires_release_branch() {
    let dir = repo();
    let git = FakeGit::new(dir.path(), "main");
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    let err = Workflow::new(config(dir.path(), "v1.2.0"), &git, &gh, None, &log)
      .run()
      .unwrap_err();
    assert!(matches!(
      err,
      ReleaseError::Policy(PolicyError::ReleaseBranchMissing { ref branch }) if branch == "release/studioctl/v1.2"
    ));
  }

  #[test]
  fn test_stable_switches_to_release_branch() {
    let dir = repo();
    let mut git = FakeGit::new(dir.path(), "main");
    git.remote_branches.push("release/studioctl/v1.2".to_string());
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    Workflow::new(config(dir.path(), "v1.2.0"), &git, &gh, None, &log)
      .run()
      .unwrap();

    assert!(git.wrote("checkout release/studioctl/v1.2"));
    assert!(git.wrote("pull --ff-only origin release/studioctl/v1.2"));
    let release = &gh.releases.borrow()[0];
    assert_eq!(release.target, "release/studioctl/v1.2");
    assert!(!release.prerelease);
    assert!(release.assets.is_empty());
    assert!(log.contains("changelog-only release"));
  }

  #[test]
  fn test_stable_switch_requires_clean_tree() {
    let dir = repo();
    let mut git = FakeGit::new(dir.path(), "main");
    git.remote_branches.push("release/studioctl/v1.2".to_string());
    git.dirty = true;
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    let err = Workflow::new(config(dir.path(), "v1.2.0"), &git, &gh, None, &log)
      .run()
      .unwrap_err();
    assert!(matches!(err, ReleaseError::Policy(PolicyError::DirtyWorkingTree)));
    assert!(git.writes.borrow().is_empty());
  }

  #[test]
  fn test_missing_section_suggests_prepare() {
    let dir = repo();
    let git = FakeGit::new(dir.path(), "main");
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();

    let err = Workflow::new(config(dir.path(), "v1.3.0-preview.1"), &git, &gh, None, &log)
      .run()
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(
      err.help_message().unwrap(),
      "Run: releaser prepare --component studioctl --version v1.3.0-preview.1"
    );
  }

  #[test]
  fn test_dry_run_builds_but_does_not_publish() {
    let dir = repo();
    let mut git = FakeGit::new(dir.path(), "main")
      .with_file("origin/release/studioctl/v1.2", CHANGELOG_PATH, CHANGELOG);
    git.remote_branches.push("release/studioctl/v1.2".to_string());
    let gh = FakeGitHub::default();
    let builder = FakeBuilder::default();
    let log = MemoryLogger::default();

    let mut cfg = config(dir.path(), "v1.2.0");
    cfg.dry_run = true;
    // Stale working-tree copy must not be consulted
    fs::write(dir.path().join(CHANGELOG_PATH), "## [Unreleased]\n").unwrap();

    Workflow::new(cfg, &git, &gh, Some(&builder), &log).run().unwrap();

    assert_eq!(builder.builds.borrow().as_slice(), ["v1.2.0"]);
    assert!(gh.releases.borrow().is_empty());
    assert!(git.reads.borrow().iter().any(|r| r == "show origin/release/studioctl/v1.2:src/cli/CHANGELOG.md"));
    assert!(log.contains("(dry-run) Would create release:"));
    assert!(log.contains("Asset: tool-v1.2.0.tar.gz"));
    assert!(log.contains("Dry run completed"));
  }

  #[test]
  fn test_cancelled_before_first_step() {
    let dir = repo();
    let git = FakeGit::new(dir.path(), "main");
    let gh = FakeGitHub::default();
    let log = MemoryLogger::default();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = Workflow::new(config(dir.path(), "v1.2.0-preview.1"), &git, &gh, None, &log)
      .with_cancel(cancel)
      .run()
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(log.steps().is_empty());
  }
}
