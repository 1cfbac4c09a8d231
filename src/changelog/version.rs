//! Semantic versions as they appear in changelog headers and release tags
//!
//! Accepted shape: `v?MAJOR.MINOR.PATCH(-PRERELEASE)?`. Build metadata is not
//! part of the release vocabulary and is rejected.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::ChangelogError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.]+))?$").expect("version regex is valid")
});

static VERSION_PREFIX_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+").expect("version prefix regex is valid"));

/// A parsed release version
///
/// Immutable once parsed. Equality and ordering follow semver precedence:
/// core numbers first, then a stable version outranks any prerelease of the
/// same core, then prerelease identifiers left to right.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
  major: u64,
  minor: u64,
  patch: u64,
  pre: semver::Prerelease,
}

impl Version {
  /// Parse `v1.2.3`, `1.2.3` or `1.2.3-preview.1`
  pub fn parse(input: &str) -> Result<Self, ChangelogError> {
    let invalid = || ChangelogError::InvalidVersion {
      value: input.to_string(),
    };

    let caps = VERSION_RE.captures(input).ok_or_else(invalid)?;
    let number = |idx: usize| caps[idx].parse::<u64>().map_err(|_| invalid());

    let pre = match caps.get(4) {
      Some(m) => semver::Prerelease::new(m.as_str()).map_err(|_| invalid())?,
      None => semver::Prerelease::EMPTY,
    };

    Ok(Self {
      major: number(1)?,
      minor: number(2)?,
      patch: number(3)?,
      pre,
    })
  }

  pub fn major(&self) -> u64 {
    self.major
  }

  pub fn minor(&self) -> u64 {
    self.minor
  }

  pub fn patch(&self) -> u64 {
    self.patch
  }

  /// Prerelease identifier text, if any
  pub fn prerelease(&self) -> Option<&str> {
    if self.pre.is_empty() { None } else { Some(self.pre.as_str()) }
  }

  pub fn is_prerelease(&self) -> bool {
    !self.pre.is_empty()
  }

  /// (major, minor, patch), ignoring the prerelease
  pub fn core(&self) -> (u64, u64, u64) {
    (self.major, self.minor, self.patch)
  }

  /// (major, minor): the release line this version belongs to
  pub fn line(&self) -> (u64, u64) {
    (self.major, self.minor)
  }

  /// Version number without the `v` prefix, as written in changelog headers
  pub fn num(&self) -> String {
    match self.prerelease() {
      Some(pre) => format!("{}.{}.{}-{}", self.major, self.minor, self.patch, pre),
      None => format!("{}.{}.{}", self.major, self.minor, self.patch),
    }
  }
}

impl Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    self.core().cmp(&other.core()).then_with(|| {
      match (self.is_prerelease(), other.is_prerelease()) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Greater,
        (true, false) => Ordering::Less,
        // Numeric identifiers compare numerically and rank below alphanumeric ones;
        // a strict prefix ranks lower.
        (true, true) => self.pre.cmp(&other.pre),
      }
    })
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v{}", self.num())
  }
}

impl std::str::FromStr for Version {
  type Err = ChangelogError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Version::parse(s)
  }
}

/// Strip an optional `<component>/` prefix and a leading `v`
///
/// Returns `None` unless what remains starts with `MAJOR.MINOR.PATCH`.
pub fn normalize_version(input: &str) -> Option<&str> {
  let tail = match input.rfind('/') {
    Some(slash) => &input[slash + 1..],
    None => input,
  };
  let tail = tail.strip_prefix('v').unwrap_or(tail);

  if VERSION_PREFIX_RE.is_match(tail) { Some(tail) } else { None }
}
