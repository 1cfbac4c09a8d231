//! Decide which version CI should release for a base branch
//!
//! - trunk: the highest prerelease in the changelog
//! - `release/<component>/vX.Y`: the highest stable `X.Y.*`

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::changelog::{self, Changelog, Version};
use crate::core::error::{InputError, ReleaseError, ReleaseResult};

static RELEASE_BASE_BRANCH_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^release/([a-z0-9-]+)/v(\d+)\.(\d+)$").expect("release branch regex is valid")
});

/// What a base branch selects from the changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseBranch {
  Trunk,
  ReleaseLine { major: u64, minor: u64 },
}

impl BaseBranch {
  /// Classify `branch` for `component`
  pub fn parse(component: &str, branch: &str, trunk: &str) -> ReleaseResult<Self> {
    if branch.is_empty() {
      return Err(InputError::MissingField { field: "base branch" }.into());
    }
    if branch == trunk {
      return Ok(BaseBranch::Trunk);
    }

    let invalid = || {
      ReleaseError::Input(InputError::InvalidBaseBranch {
        branch: branch.to_string(),
        trunk: trunk.to_string(),
      })
    };
    let caps = RELEASE_BASE_BRANCH_RE.captures(branch).ok_or_else(invalid)?;
    if &caps[1] != component {
      return Err(
        InputError::ComponentMismatch {
          branch: branch.to_string(),
          component: component.to_string(),
        }
        .into(),
      );
    }

    Ok(BaseBranch::ReleaseLine {
      major: caps[2].parse().map_err(|_| invalid())?,
      minor: caps[3].parse().map_err(|_| invalid())?,
    })
  }
}

/// Pick the version to release from an already parsed changelog
pub fn select_version(changelog: &Changelog, base: BaseBranch) -> ReleaseResult<Version> {
  let version = match base {
    BaseBranch::Trunk => changelog.latest_prerelease()?,
    BaseBranch::ReleaseLine { major, minor } => changelog.latest_stable_for_line(major, minor)?,
  };
  Ok(version.clone())
}

/// Read the working-tree changelog and pick the version for `branch`
pub fn resolve_version(
  repo_root: &Path,
  changelog_path: &str,
  component: &str,
  branch: &str,
  trunk: &str,
) -> ReleaseResult<Version> {
  let base = BaseBranch::parse(component, branch, trunk)?;

  let path = repo_root.join(changelog_path);
  let content = fs::read_to_string(&path).map_err(|e| ReleaseError::file(&path, e))?;
  let doc = changelog::parse(&content)?;

  let version = select_version(&doc, base)?;
  log::debug!("resolved {} for {} from {}", version, branch, changelog_path);
  Ok(version)
}
