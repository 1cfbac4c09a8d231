//! Integration tests for `releaser workflow`, `resolve-version`

use crate::helpers::{TestRepo, git, run_releaser, run_releaser_ok, stderr, stdout};
use anyhow::Result;

const CHANGELOG_CONTENT: &str = "\
## [Unreleased]

## [1.1.0-preview.1] - 2025-06-01

### Added

- Preview feature

## [1.0.1] - 2025-05-10

### Fixed

- Patch fix

## [1.0.0] - 2025-05-01

### Added

- Initial
";

const BUILD: &str = r#"
[components.build]
command = ["sh", "-c", "echo bin > \"$RELEASE_OUTPUT_DIR/studioctl-$RELEASE_VERSION.tar.gz\""]
checksums = true
"#;

#[test]
fn test_requires_ci_without_dry_run() -> Result<()> {
  let repo = TestRepo::new(CHANGELOG_CONTENT)?;

  let output = run_releaser(&repo.path, &["workflow", "--component", "studioctl", "--base-branch", "main"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("workflow command may only run in CI (CI=true)"));
  Ok(())
}

#[test]
fn test_dry_run_prerelease_builds_and_plans_release() -> Result<()> {
  let repo = TestRepo::with_config(CHANGELOG_CONTENT, BUILD)?;

  let output = run_releaser_ok(
    &repo.path,
    &["workflow", "--component", "studioctl", "--base-branch", "main", "--dry-run"],
  )?;
  let out = stdout(&output);
  assert!(out.contains("studioctl/v1.1.0-preview.1"));
  assert!(out.contains("(dry-run) Would create release:"));
  assert!(out.contains("Asset: studioctl-v1.1.0-preview.1.tar.gz"));
  assert!(out.contains("Asset: SHA256SUMS"));

  assert_eq!(repo.read("build/release/release-notes.md")?.trim_end(), "### Added\n- Preview feature");
  assert!(repo.read("build/release/SHA256SUMS")?.contains("  studioctl-v1.1.0-preview.1.tar.gz\n"));
  Ok(())
}

#[test]
fn test_dry_run_stable_reads_release_branch() -> Result<()> {
  let repo = TestRepo::new(CHANGELOG_CONTENT)?;
  repo.push_branch("release/studioctl/v1.0")?;

  let output = run_releaser_ok(
    &repo.path,
    &["workflow", "--component", "studioctl", "--base-branch", "release/studioctl/v1.0", "--dry-run"],
  )?;
  let out = stdout(&output);
  assert!(out.contains("studioctl/v1.0.1"));
  assert!(out.contains("Changelog section found"));
  assert_eq!(repo.current_branch()?, "main");
  Ok(())
}

#[test]
fn test_existing_tag_fails() -> Result<()> {
  let repo = TestRepo::new(CHANGELOG_CONTENT)?;
  git(&repo.path, &["tag", "studioctl/v1.1.0-preview.1"])?;

  let output = run_releaser(
    &repo.path,
    &["workflow", "--component", "studioctl", "--base-branch", "main", "--dry-run"],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("tag already exists: studioctl/v1.1.0-preview.1"));
  Ok(())
}

#[test]
fn test_resolve_version_json() -> Result<()> {
  let repo = TestRepo::new(CHANGELOG_CONTENT)?;

  let output = run_releaser_ok(
    &repo.path,
    &["resolve-version", "--component", "studioctl", "--base-branch", "release/studioctl/v1.0", "--json"],
  )?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["version"], "v1.0.1");
  assert_eq!(json["tag"], "studioctl/v1.0.1");
  assert_eq!(json["base_branch"], "release/studioctl/v1.0");
  Ok(())
}

#[test]
fn test_resolve_version_rejects_foreign_release_branch() -> Result<()> {
  let repo = TestRepo::new(CHANGELOG_CONTENT)?;

  let output = run_releaser(
    &repo.path,
    &["resolve-version", "--component", "studioctl", "--base-branch", "release/other/v1.0"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("does not belong to component studioctl"));
  Ok(())
}
