//! Integration tests for `releaser backport`

use crate::helpers::{CHANGELOG, TestRepo, run_releaser, run_releaser_ok, stderr, stdout};
use anyhow::Result;

const RELEASED: &str = "## [Unreleased]\n\n## [1.0.0] - 2025-01-01\n\n### Added\n\n- Initial\n";

#[test]
fn test_dry_run_lists_extracted_entries() -> Result<()> {
  let repo = TestRepo::new(RELEASED)?;
  repo.push_branch("release/studioctl/v1.0")?;
  repo.write(
    CHANGELOG,
    "## [Unreleased]\n\n### Fixed\n\n- Crash on start\n\n## [1.0.0] - 2025-01-01\n\n### Added\n\n- Initial\n",
  )?;
  let sha = repo.commit("fix crash on start")?;

  let output = run_releaser_ok(
    &repo.path,
    &["backport", "--component", "studioctl", "--commit", &sha, "--branch", "v1.0", "--dry-run"],
  )?;
  let out = stdout(&output);
  assert!(out.contains(&format!("Would cherry-pick commit: {} (fix crash on start)", &sha[..8])));
  assert!(out.contains(&format!("Would create backport branch: backport/studioctl-v1.0-{}", &sha[..8])));
  assert!(out.contains("[Fixed] Crash on start"));
  assert_eq!(repo.current_branch()?, "main");
  Ok(())
}

#[test]
fn test_commit_without_changelog_entries_fails() -> Result<()> {
  let repo = TestRepo::new(RELEASED)?;
  repo.write("src/cli/main.go", "package main\n")?;
  let sha = repo.commit("code only")?;

  let output = run_releaser(
    &repo.path,
    &["backport", "--component", "studioctl", "--commit", &sha, "--branch", "v1.0", "--dry-run"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("no changelog entries found in commit"));
  Ok(())
}

#[test]
fn test_bad_branch_format_fails() -> Result<()> {
  let repo = TestRepo::new(RELEASED)?;
  let sha = repo.head()?;

  let output = run_releaser(
    &repo.path,
    &["backport", "--component", "studioctl", "--commit", &sha, "--branch", "release/studioctl/v1.0"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("expected vX.Y"));
  Ok(())
}
