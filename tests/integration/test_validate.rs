//! Integration tests for `releaser validate-changelog`

use crate::helpers::{CHANGELOG, TestRepo, run_releaser, run_releaser_ok, stderr, stdout};
use anyhow::Result;

const BASE: &str = "## [Unreleased]\n\n### Added\n\n- Search\n\n## [1.0.0] - 2025-01-01\n\n### Added\n\n- Initial\n";

#[test]
fn test_new_entry_passes() -> Result<()> {
  let repo = TestRepo::new(BASE)?;
  let base = repo.head()?;
  repo.write(
    CHANGELOG,
    "## [Unreleased]\n\n### Added\n\n- Search\n\n### Fixed\n\n- Crash\n\n## [1.0.0] - 2025-01-01\n\n### Added\n\n- Initial\n",
  )?;
  let head = repo.commit("fix: crash")?;

  let output = run_releaser_ok(
    &repo.path,
    &["validate-changelog", "--component", "studioctl", "--base", &base, "--head", &head],
  )?;
  assert!(stdout(&output).contains("changelog validated"));
  Ok(())
}

#[test]
fn test_untouched_changelog_fails() -> Result<()> {
  let repo = TestRepo::new(BASE)?;
  let base = repo.head()?;
  repo.write("src/cli/main.go", "package main\n")?;
  let head = repo.commit("chore: code only")?;

  let output = run_releaser(
    &repo.path,
    &["validate-changelog", "--component", "studioctl", "--base", &base, "--head", &head],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("changelog not modified: src/cli/CHANGELOG.md"));
  Ok(())
}

#[test]
fn test_release_promotion_passes() -> Result<()> {
  let repo = TestRepo::new(BASE)?;
  let base = repo.head()?;
  repo.write(
    CHANGELOG,
    "## [Unreleased]\n\n## [1.1.0] - 2025-02-01\n\n### Added\n\n- Search\n\n## [1.0.0] - 2025-01-01\n\n### Added\n\n- Initial\n",
  )?;
  let head = repo.commit("Release studioctl v1.1.0")?;

  run_releaser_ok(
    &repo.path,
    &["validate-changelog", "--component", "studioctl", "--base", &base, "--head", &head],
  )?;
  Ok(())
}

#[test]
fn test_unknown_component_is_input_error() -> Result<()> {
  let repo = TestRepo::new(BASE)?;
  let head = repo.head()?;

  let output = run_releaser(
    &repo.path,
    &["validate-changelog", "--component", "nope", "--base", &head, "--head", &head],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("unknown component: nope"));
  Ok(())
}
