//! Cross-section invariants for released versions
//!
//! Checked after every parse and after every transform that inserts a section:
//! - no duplicate version numbers
//! - precedence never increases going down the document
//! - the leading run of prereleases stays on one (major, minor) line

use std::collections::HashSet;

use super::document::Release;
use crate::core::error::ChangelogError;

/// Re-check the released-section invariants
pub fn validate_version_sections(releases: &[Release]) -> Result<(), ChangelogError> {
  let mut seen = HashSet::with_capacity(releases.len());
  let mut prev = None;

  for release in releases {
    let current = &release.version;
    if !seen.insert(current.num()) {
      return Err(ChangelogError::DuplicateVersion {
        version: current.to_string(),
      });
    }

    if let Some(prev) = prev
      && current > prev
    {
      return Err(ChangelogError::VersionOrder {
        version: current.to_string(),
        after: prev.to_string(),
      });
    }
    prev = Some(current);
  }

  validate_active_prerelease_line(releases)
}

/// Only one prerelease line may sit above the newest stable release
fn validate_active_prerelease_line(releases: &[Release]) -> Result<(), ChangelogError> {
  let mut active = None;

  for release in releases.iter().take_while(|r| r.version.is_prerelease()) {
    let line = release.version.line();
    match active {
      None => active = Some(line),
      Some(first) if first != line => {
        return Err(ChangelogError::PrereleaseConflict { first, second: line });
      }
      Some(_) => {}
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::changelog::parse;
  use crate::core::error::ChangelogError;

  #[test]
  fn test_ascending_versions_fail() {
    let err = parse("## [Unreleased]\n\n## [1.1.0]\n\n## [1.2.0]\n").unwrap_err();
    assert_eq!(
      err,
      ChangelogError::VersionOrder {
        version: "v1.2.0".to_string(),
        after: "v1.1.0".to_string(),
      }
    );
  }

  #[test]
  fn test_stable_must_precede_its_prereleases() {
    let err = parse("## [1.2.0-preview.1]\n\n## [1.2.0]\n").unwrap_err();
    assert!(matches!(err, ChangelogError::VersionOrder { .. }));
  }

  #[test]
  fn test_duplicate_versions_fail() {
    let err = parse("## [1.1.0]\n\n## [v1.1.0]\n").unwrap_err();
    assert_eq!(
      err,
      ChangelogError::DuplicateVersion {
        version: "v1.1.0".to_string()
      }
    );
  }

  #[test]
  fn test_conflicting_prerelease_lines_at_top_fail() {
    let err = parse("## [Unreleased]\n\n## [1.3.0-preview.1]\n\n## [1.2.0-preview.4]\n\n## [1.1.0]\n").unwrap_err();
    assert_eq!(
      err,
      ChangelogError::PrereleaseConflict {
        first: (1, 3),
        second: (1, 2),
      }
    );
    assert!(err.to_string().contains("saw v1.3 and v1.2 at top of changelog"));
  }

  #[test]
  fn test_prerelease_lines_below_stable_are_allowed() {
    let doc = parse("## [Unreleased]\n\n## [1.4.0]\n\n## [1.3.0-preview.1]\n\n## [1.2.0-preview.4]\n\n## [1.1.0]\n");
    assert!(doc.is_ok());
  }

  #[test]
  fn test_same_line_prereleases_at_top_are_allowed() {
    let doc = parse("## [1.3.0-preview.2]\n\n## [1.3.0-preview.1]\n\n## [1.2.0]\n");
    assert!(doc.is_ok());
  }
}
