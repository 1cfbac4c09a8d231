//! Tag, branch, label and title naming for a component release

use std::sync::LazyLock;

use regex::Regex;

use crate::changelog::Version;
use crate::core::error::{InputError, ReleaseResult};

/// Release notes file written into the output directory
pub const RELEASE_NOTES_FILE: &str = "release-notes.md";

const SHORT_SHA_LEN: usize = 8;

static RELEASE_LINE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)$").expect("release line regex is valid"));

/// A component version about to be released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
  pub component: String,
  pub version: Version,
}

impl ReleaseTag {
  /// Accepts the version with or without the leading `v`
  pub fn parse(component: &str, version: &str) -> ReleaseResult<Self> {
    Ok(Self {
      component: component.to_string(),
      version: Version::parse(version)?,
    })
  }

  /// `studioctl/v1.2.3`
  pub fn full(&self) -> String {
    format!("{}/{}", self.component, self.version)
  }

  /// `release/studioctl/v1.2`
  pub fn release_branch(&self) -> String {
    release_branch(&self.component, self.version.major(), self.version.minor())
  }

  /// `studioctl v1.2.3`
  pub fn title(&self) -> String {
    format!("{} {}", self.component, self.version)
  }

  /// `release-prep/studioctl-v1.2.3`
  pub fn prep_branch(&self) -> String {
    format!("release-prep/{}-{}", self.component, self.version)
  }

  pub fn is_prerelease(&self) -> bool {
    self.version.is_prerelease()
  }
}

pub fn release_branch(component: &str, major: u64, minor: u64) -> String {
  format!("release/{}/v{}.{}", component, major, minor)
}

/// PR label for release-prep PRs
pub fn release_label(component: &str) -> String {
  format!("release/{}", component)
}

/// PR label for backport PRs
pub fn backport_label(component: &str) -> String {
  format!("backport/{}", component)
}

/// `backport/studioctl-v1.0-abcdef12`
pub fn backport_branch(component: &str, line: (u64, u64), commit: &str) -> String {
  format!("backport/{}-v{}.{}-{}", component, line.0, line.1, short_sha(commit))
}

/// First eight characters of a commit, or the whole thing if shorter
pub fn short_sha(commit: &str) -> &str {
  match commit.char_indices().nth(SHORT_SHA_LEN) {
    Some((idx, _)) => &commit[..idx],
    None => commit,
  }
}

/// Parse a backport target `vMAJOR.MINOR`
pub fn parse_release_line(value: &str) -> ReleaseResult<(u64, u64)> {
  let invalid = || InputError::InvalidReleaseLine {
    value: value.to_string(),
  };
  let caps = RELEASE_LINE_RE.captures(value).ok_or_else(invalid)?;
  let major = caps[1].parse().map_err(|_| invalid())?;
  let minor = caps[2].parse().map_err(|_| invalid())?;
  Ok((major, minor))
}
