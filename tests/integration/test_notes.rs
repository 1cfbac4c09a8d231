//! Integration tests for `releaser notes`

use crate::helpers::{TestRepo, run_releaser, run_releaser_ok, stdout};
use anyhow::Result;

const CONTENT: &str = "\
## [Unreleased]

## [1.2.0] - 2025-03-01

### Added

- Export

### Fixed

- Import crash
";

#[test]
fn test_prints_section_body() -> Result<()> {
  let repo = TestRepo::new(CONTENT)?;

  let output = run_releaser_ok(&repo.path, &["notes", "--component", "studioctl", "--version", "v1.2.0"])?;
  assert_eq!(stdout(&output), "### Added\n- Export\n\n### Fixed\n- Import crash\n");
  Ok(())
}

#[test]
fn test_missing_version_is_document_error() -> Result<()> {
  let repo = TestRepo::new(CONTENT)?;

  let output = run_releaser(&repo.path, &["notes", "--component", "studioctl", "--version", "v9.9.9"])?;
  assert_eq!(output.status.code(), Some(3));
  Ok(())
}
