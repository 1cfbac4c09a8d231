//! Changelog document tree, rendering and read-only queries

use std::fmt;

use chrono::NaiveDate;

use super::category::Category;
use super::version::{Version, normalize_version};
use crate::core::error::ChangelogError;

/// One category header and its entries, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntries {
  pub category: Category,
  pub entries: Vec<String>,
}

impl CategoryEntries {
  pub fn new(category: Category) -> Self {
    Self {
      category,
      entries: Vec::new(),
    }
  }
}

/// A (category, text) pair moved between Unreleased, diffs and backports
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
  pub category: Category,
  pub text: String,
}

impl Entry {
  pub fn new(category: Category, text: impl Into<String>) -> Self {
    Self {
      category,
      text: text.into(),
    }
  }
}

/// The `## [Unreleased]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unreleased {
  pub categories: Vec<CategoryEntries>,
}

/// A released `## [x.y.z] - date` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub version: Version,
  pub date: Option<NaiveDate>,
  pub categories: Vec<CategoryEntries>,
}

impl Release {
  /// Markdown body of this section (no version header)
  pub fn body(&self) -> String {
    render_categories(&self.categories)
  }

  /// Every (category, text) pair in this section
  pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
    flatten(&self.categories)
  }
}

impl Unreleased {
  pub fn body(&self) -> String {
    render_categories(&self.categories)
  }

  pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
    flatten(&self.categories)
  }
}

/// A parsed Keep a Changelog document
///
/// Values are never edited in place by the transforms in this crate; each
/// transform returns a fresh document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changelog {
  /// Text before the first section header, trailing newlines trimmed
  pub preamble: String,
  pub unreleased: Option<Unreleased>,
  /// Released sections in document order (newest first)
  pub releases: Vec<Release>,
  /// Entries added by a diff, only populated by `parse_with_diff`
  pub added_entries: Vec<Entry>,
}

impl Changelog {
  /// Look up a released section by `1.2.3`, `v1.2.3` or `component/v1.2.3`
  pub fn get_version(&self, version: &str) -> Option<&Release> {
    let normalized = normalize_version(version)?;
    self.releases.iter().find(|r| r.version.num() == normalized)
  }

  pub fn has_version(&self, version: &str) -> bool {
    self.get_version(version).is_some()
  }

  /// Highest prerelease among released sections
  pub fn latest_prerelease(&self) -> Result<&Version, ChangelogError> {
    self.latest_matching(Version::is_prerelease, "any prerelease")
  }

  /// Highest stable version on the `major.minor` line
  pub fn latest_stable_for_line(&self, major: u64, minor: u64) -> Result<&Version, ChangelogError> {
    self.latest_matching(
      |v| !v.is_prerelease() && v.line() == (major, minor),
      &format!("v{}.{}", major, minor),
    )
  }

  fn latest_matching<F>(&self, predicate: F, wanted: &str) -> Result<&Version, ChangelogError>
  where
    F: Fn(&Version) -> bool,
  {
    if self.releases.is_empty() {
      return Err(ChangelogError::NoReleasedVersions);
    }
    self
      .releases
      .iter()
      .map(|r| &r.version)
      .filter(|v| predicate(v))
      .max()
      .ok_or_else(|| ChangelogError::NoMatchingVersion {
        wanted: wanted.to_string(),
      })
  }

  /// Release notes for `version` as markdown
  pub fn extract_notes(&self, version: &str) -> Result<String, ChangelogError> {
    match self.get_version(version) {
      Some(release) => Ok(release.body()),
      None if normalize_version(version).is_none() => Err(ChangelogError::InvalidVersion {
        value: version.to_string(),
      }),
      None => Err(ChangelogError::VersionNotFound {
        version: version.to_string(),
      }),
    }
  }

  /// Check that Unreleased exists, has a header and at least one entry
  ///
  /// One non-empty category is enough, even next to empty ones.
  pub fn validate_unreleased(&self) -> Result<(), ChangelogError> {
    let unreleased = self.unreleased.as_ref().ok_or(ChangelogError::NoUnreleased)?;
    if unreleased.categories.is_empty() {
      return Err(ChangelogError::UnreleasedNoHeader);
    }
    if unreleased.categories.iter().any(|c| !c.entries.is_empty()) {
      Ok(())
    } else {
      Err(ChangelogError::UnreleasedNoEntry)
    }
  }

  /// Serialize back to markdown
  pub fn render(&self) -> String {
    let mut out = String::new();

    if !self.preamble.is_empty() {
      out.push_str(&self.preamble);
      out.push_str("\n\n");
    }

    if let Some(unreleased) = &self.unreleased {
      out.push_str("## [Unreleased]");
      let body = unreleased.body();
      if !body.is_empty() {
        out.push_str("\n\n");
        out.push_str(&body);
      }
      out.push('\n');
    }

    for (i, release) in self.releases.iter().enumerate() {
      if self.unreleased.is_some() || i > 0 {
        out.push('\n');
      }
      out.push_str("## [");
      out.push_str(&release.version.num());
      out.push(']');
      if let Some(date) = release.date {
        out.push_str(" - ");
        out.push_str(&date.format("%Y-%m-%d").to_string());
      }
      let body = release.body();
      if !body.is_empty() {
        out.push_str("\n\n");
        out.push_str(&body);
      }
      out.push('\n');
    }

    let trimmed = out.trim_end_matches('\n');
    format!("{}\n", trimmed)
  }
}

impl fmt::Display for Changelog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render())
  }
}

/// Render categories in vocabulary order, blank line between them
pub fn render_categories(categories: &[CategoryEntries]) -> String {
  let mut sorted = categories.to_vec();
  sort_categories(&mut sorted);

  let mut out = String::new();
  for (i, group) in sorted.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    out.push_str("### ");
    out.push_str(group.category.name());
    out.push('\n');
    for entry in &group.entries {
      out.push_str("- ");
      out.push_str(entry);
      out.push('\n');
    }
  }

  out.trim_end_matches('\n').to_string()
}

/// Stable sort into vocabulary order
pub fn sort_categories(categories: &mut [CategoryEntries]) {
  categories.sort_by_key(|c| c.category);
}

fn flatten(categories: &[CategoryEntries]) -> impl Iterator<Item = Entry> + '_ {
  categories
    .iter()
    .flat_map(|c| c.entries.iter().map(move |text| Entry::new(c.category, text.clone())))
}
