//! Line-oriented changelog parser
//!
//! Recognizes four line kinds:
//! - `## [Unreleased]`
//! - `## [1.2.3] - 2024-01-15` (date optional, `v` prefix tolerated)
//! - `### Category`
//! - `- entry` / `* entry`
//!
//! Anything before the first section header is preamble. Other lines inside
//! sections are dropped.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::category::{Category, OrderTracker};
use super::diff::extract_entries;
use super::document::{CategoryEntries, Changelog, Release, Unreleased};
use super::validate::validate_version_sections;
use super::version::Version;
use crate::core::error::ChangelogError;

pub(crate) static UNRELEASED_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^## \[Unreleased\]").expect("unreleased regex is valid"));

pub(crate) static VERSION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^## \[v?(\d+\.\d+\.\d+(?:-[a-zA-Z0-9.]+)?)\](?:\s+-\s+(\d{4}-\d{2}-\d{2}))?")
    .expect("version header regex is valid")
});

pub(crate) static CATEGORY_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^### (\w+)").expect("category regex is valid"));

pub(crate) static LIST_ITEM_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[-*]\s+(.+)").expect("list item regex is valid"));

/// Where new categories go while scanning
enum Cursor {
  None,
  Unreleased,
  Release(usize),
}

/// Parse changelog text into a validated document
pub fn parse(content: &str) -> Result<Changelog, ChangelogError> {
  let doc = parse_content(content)?;
  validate_version_sections(&doc.releases)?;
  Ok(doc)
}

/// Parse changelog text and collect the entries a diff adds to it
///
/// A diff that does not touch `changelog_path`, or touches it without adding
/// entries, leaves `added_entries` empty rather than failing.
pub fn parse_with_diff(content: &str, diff: &str, changelog_path: &str) -> Result<Changelog, ChangelogError> {
  let mut doc = parse(content)?;
  if !diff.is_empty() && !changelog_path.is_empty() {
    match extract_entries(diff, changelog_path) {
      Ok(entries) => doc.added_entries = entries,
      Err(ChangelogError::NoChangelogInDiff { .. } | ChangelogError::NoEntriesInDiff { .. }) => {}
      Err(e) => return Err(e),
    }
  }
  Ok(doc)
}

fn parse_content(content: &str) -> Result<Changelog, ChangelogError> {
  let mut doc = Changelog::default();
  let mut preamble = String::new();
  let mut cursor = Cursor::None;
  let mut current: Option<CategoryEntries> = None;
  let mut order = OrderTracker::default();

  for line in content.lines() {
    if UNRELEASED_RE.is_match(line) {
      flush(&mut doc, &cursor, current.take());
      doc.unreleased = Some(Unreleased::default());
      cursor = Cursor::Unreleased;
      order.reset();
      continue;
    }

    if let Some(caps) = VERSION_HEADER_RE.captures(line) {
      flush(&mut doc, &cursor, current.take());
      let version = Version::parse(&caps[1])?;
      let date = match caps.get(2) {
        Some(m) => Some(
          NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").map_err(|_| ChangelogError::InvalidDate {
            value: m.as_str().to_string(),
          })?,
        ),
        None => None,
      };
      doc.releases.push(Release {
        version,
        date,
        categories: Vec::new(),
      });
      cursor = Cursor::Release(doc.releases.len() - 1);
      order.reset();
      continue;
    }

    if let Some(caps) = CATEGORY_RE.captures(line) {
      if matches!(cursor, Cursor::None) {
        continue;
      }
      let name = &caps[1];
      let category = Category::from_name(name).ok_or_else(|| ChangelogError::InvalidCategory {
        name: name.to_string(),
      })?;
      order
        .advance(category)
        .map_err(|after| ChangelogError::CategoryOrder { category, after })?;

      flush(&mut doc, &cursor, current.take());
      current = Some(CategoryEntries::new(category));
      continue;
    }

    if let Some(caps) = LIST_ITEM_RE.captures(line) {
      if let Some(group) = current.as_mut() {
        group.entries.push(caps[1].to_string());
      }
      continue;
    }

    if matches!(cursor, Cursor::None) && (!preamble.is_empty() || !line.trim().is_empty()) {
      preamble.push_str(line);
      preamble.push('\n');
    }
  }

  flush(&mut doc, &cursor, current.take());
  doc.preamble = preamble.trim_end_matches('\n').to_string();
  Ok(doc)
}

/// Attach a finished category to whichever section is open
fn flush(doc: &mut Changelog, cursor: &Cursor, group: Option<CategoryEntries>) {
  let Some(group) = group else {
    return;
  };
  match cursor {
    Cursor::Unreleased => {
      if let Some(unreleased) = doc.unreleased.as_mut() {
        unreleased.categories.push(group);
      }
    }
    Cursor::Release(idx) => {
      if let Some(release) = doc.releases.get_mut(*idx) {
        release.categories.push(group);
      }
    }
    Cursor::None => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_sections_and_entries() {
    let doc = parse(
      "# Changelog\n\n## [Unreleased]\n\n### Added\n- One\n* Two\n\n## [v1.0.0] - 2024-01-15\n\n### Fixed\n- Three\n",
    )
    .unwrap();

    assert_eq!(doc.preamble, "# Changelog");
    let unreleased = doc.unreleased.as_ref().unwrap();
    assert_eq!(unreleased.categories.len(), 1);
    assert_eq!(unreleased.categories[0].entries, vec!["One", "Two"]);

    assert_eq!(doc.releases.len(), 1);
    let release = &doc.releases[0];
    assert_eq!(release.version.num(), "1.0.0");
    assert_eq!(release.date, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(release.categories[0].category, Category::Fixed);
  }

  #[test]
  fn test_preamble_skips_leading_blank_lines() {
    let doc = parse("\n\n# Title\n\nIntro text\n\n\n## [Unreleased]\n").unwrap();
    assert_eq!(doc.preamble, "# Title\n\nIntro text");
  }

  #[test]
  fn test_rejects_unknown_category() {
    let err = parse("## [Unreleased]\n\n### Breaking\n- x\n").unwrap_err();
    assert_eq!(
      err,
      ChangelogError::InvalidCategory {
        name: "Breaking".to_string()
      }
    );
    assert!(err.to_string().contains("valid categories: Added, Changed"));
  }

  #[test]
  fn test_rejects_out_of_order_category() {
    let err = parse("## [Unreleased]\n\n### Fixed\n- a\n\n### Added\n- b\n").unwrap_err();
    assert_eq!(
      err,
      ChangelogError::CategoryOrder {
        category: Category::Added,
        after: Category::Fixed,
      }
    );
  }

  #[test]
  fn test_category_order_resets_per_section() {
    let doc = parse("## [Unreleased]\n\n### Fixed\n- a\n\n## [1.0.0]\n\n### Added\n- b\n").unwrap();
    assert_eq!(doc.releases[0].categories[0].category, Category::Added);
  }

  #[test]
  fn test_category_outside_section_is_ignored() {
    let doc = parse("# Title\n### Nonsense\n\n## [Unreleased]\n").unwrap();
    assert_eq!(doc.preamble, "# Title");
  }

  #[test]
  fn test_rejects_bad_date() {
    let err = parse("## [1.0.0] - 2024-13-45\n").unwrap_err();
    assert!(matches!(err, ChangelogError::InvalidDate { .. }));
  }

  #[test]
  fn test_parse_runs_section_invariants() {
    let err = parse("## [1.1.0]\n\n## [1.2.0]\n").unwrap_err();
    assert!(matches!(err, ChangelogError::VersionOrder { .. }));
  }

  #[test]
  fn test_parse_with_diff_tolerates_unrelated_diff() {
    let diff = "diff --git a/README.md b/README.md\n--- a/README.md\n+++ b/README.md\n@@ -1 +1 @@\n-old\n+new\n";
    let doc = parse_with_diff("## [Unreleased]\n", diff, "CHANGELOG.md").unwrap();
    assert!(doc.added_entries.is_empty());
  }

  #[test]
  fn test_parse_with_diff_collects_entries() {
    let diff = "diff --git a/CHANGELOG.md b/CHANGELOG.md\n--- a/CHANGELOG.md\n+++ b/CHANGELOG.md\n@@ -1,2 +1,5 @@\n ## [Unreleased]\n+\n+### Fixed\n+- Fix X\n";
    let doc = parse_with_diff("## [Unreleased]\n\n### Fixed\n- Fix X\n", diff, "CHANGELOG.md").unwrap();
    assert_eq!(doc.added_entries.len(), 1);
    assert_eq!(doc.added_entries[0].text, "Fix X");
  }
}
