//! Integration tests for `releaser prepare`
//!
//! Only dry runs: a real run ends in `gh pr create`.

use crate::helpers::{CHANGELOG, TestRepo, run_releaser, run_releaser_ok, stderr, stdout};
use anyhow::Result;

const TRUNK: &str = "## [Unreleased]\n\n### Added\n\n- X\n";

#[test]
fn test_dry_run_first_stable_plans_release_branch() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;

  let output = run_releaser_ok(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "v1.0.0", "--dry-run"],
  )?;
  let out = stdout(&output);
  assert!(out.contains("=== DRY RUN ==="));
  assert!(out.contains("Would create release branch: release/studioctl/v1.0"));
  assert!(out.contains("Would create prep branch: release-prep/studioctl-v1.0.0"));
  assert!(out.contains("Would set PR title: chore: release studioctl v1.0.0"));
  assert!(out.contains("## [1.0.0] - "));

  // Nothing moved
  assert_eq!(repo.current_branch()?, "main");
  assert_eq!(repo.read(CHANGELOG)?, TRUNK);
  assert!(!repo.remote_branches()?.contains("release/studioctl"));
  Ok(())
}

#[test]
fn test_dry_run_prerelease_targets_trunk() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;

  let output = run_releaser_ok(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "v1.0.0-preview.1", "--dry-run"],
  )?;
  let out = stdout(&output);
  assert!(out.contains("Would create PR targeting: main"));
  assert!(!out.contains("Would create release branch"));
  Ok(())
}

#[test]
fn test_patch_without_release_branch_fails() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;

  let output = run_releaser(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "v1.0.1", "--dry-run"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("release branch does not exist: release/studioctl/v1.0"));
  Ok(())
}

#[test]
fn test_first_stable_with_existing_release_branch_fails() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;
  repo.push_branch("release/studioctl/v1.0")?;

  let output = run_releaser(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "v1.0.0", "--dry-run"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("release branch already exists"));
  Ok(())
}

#[test]
fn test_dirty_tree_blocks_real_run() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;
  repo.write(CHANGELOG, "## [Unreleased]\n\n### Added\n\n- X\n- Y\n")?;

  let output = run_releaser(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "v1.0.0-preview.1", "--yes"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("working tree has uncommitted changes"));
  assert_eq!(repo.current_branch()?, "main");
  Ok(())
}

#[test]
fn test_invalid_version_is_input_error() -> Result<()> {
  let repo = TestRepo::new(TRUNK)?;

  let output = run_releaser(
    &repo.path,
    &["prepare", "--component", "studioctl", "--version", "1.0", "--dry-run"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}
