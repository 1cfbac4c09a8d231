//! Document transforms: Promote and InsertEntries
//!
//! Both take `&self` and return a fresh document. The input is never touched.

use chrono::NaiveDate;

use super::category::Category;
use super::document::{CategoryEntries, Changelog, Entry, Release, Unreleased, sort_categories};
use super::validate::validate_version_sections;
use super::version::{Version, normalize_version};
use crate::core::error::ChangelogError;

impl Changelog {
  /// Move Unreleased content into a new `version` section dated `date`
  ///
  /// A new `X.Y.0` also absorbs the entries of every `X.Y.0-*` prerelease
  /// section, oldest first, ahead of the Unreleased entries.
  pub fn promote(&self, version: &str, date: NaiveDate) -> Result<Changelog, ChangelogError> {
    let normalized = normalize_version(version).ok_or_else(|| ChangelogError::InvalidVersion {
      value: version.to_string(),
    })?;
    if self.has_version(normalized) {
      return Err(ChangelogError::VersionExists {
        version: version.to_string(),
      });
    }
    let unreleased = self.unreleased.as_ref().ok_or(ChangelogError::NoUnreleased)?;
    let target = Version::parse(normalized)?;

    let categories = promoted_categories(unreleased, &self.releases, &target);
    if categories.is_empty() {
      return Err(ChangelogError::UnreleasedEmpty);
    }

    let section = Release {
      version: target,
      date: Some(date),
      categories,
    };

    let mut releases = self.releases.clone();
    let position = releases
      .iter()
      .position(|existing| section.version > existing.version)
      .unwrap_or(releases.len());
    releases.insert(position, section);

    validate_version_sections(&releases)?;

    Ok(Changelog {
      preamble: self.preamble.clone(),
      unreleased: Some(Unreleased::default()),
      releases,
      added_entries: self.added_entries.clone(),
    })
  }

  /// Prepend `entries` to the matching Unreleased categories
  ///
  /// Not idempotent: applying the same entries twice lists them twice. The
  /// backport flow applies it exactly once per cherry-picked commit.
  pub fn insert_entries(&self, entries: &[Entry]) -> Result<Changelog, ChangelogError> {
    if entries.is_empty() {
      return Ok(self.clone());
    }
    let mut unreleased = self.unreleased.clone().ok_or(ChangelogError::NoUnreleased)?;

    for (category, texts) in group_by_category(entries) {
      match unreleased.categories.iter_mut().find(|c| c.category == category) {
        Some(existing) => {
          let mut merged = texts;
          merged.append(&mut existing.entries);
          existing.entries = merged;
        }
        None => unreleased.categories.push(CategoryEntries {
          category,
          entries: texts,
        }),
      }
    }
    sort_categories(&mut unreleased.categories);

    Ok(Changelog {
      unreleased: Some(unreleased),
      ..self.clone()
    })
  }
}

fn promoted_categories(unreleased: &Unreleased, releases: &[Release], target: &Version) -> Vec<CategoryEntries> {
  let current = non_empty(&unreleased.categories);
  if target.is_prerelease() || target.patch() > 0 {
    return current;
  }

  let history = releases
    .iter()
    .rev()
    .filter(|r| r.version.is_prerelease() && r.version.core() == target.core())
    .fold(Vec::new(), |acc, r| merge_categories(acc, non_empty(&r.categories)));

  merge_categories(history, current)
}

fn non_empty(categories: &[CategoryEntries]) -> Vec<CategoryEntries> {
  categories.iter().filter(|c| !c.entries.is_empty()).cloned().collect()
}

/// Concatenate by category, `left` entries first, then sort
fn merge_categories(left: Vec<CategoryEntries>, right: Vec<CategoryEntries>) -> Vec<CategoryEntries> {
  let mut merged: Vec<CategoryEntries> = Vec::with_capacity(left.len() + right.len());
  for mut group in left.into_iter().chain(right) {
    match merged.iter_mut().find(|c| c.category == group.category) {
      Some(existing) => existing.entries.append(&mut group.entries),
      None => merged.push(group),
    }
  }
  sort_categories(&mut merged);
  merged
}

/// Group entry texts by category, categories in first-seen order
fn group_by_category(entries: &[Entry]) -> Vec<(Category, Vec<String>)> {
  let mut groups: Vec<(Category, Vec<String>)> = Vec::new();
  for entry in entries {
    match groups.iter_mut().find(|(c, _)| *c == entry.category) {
      Some((_, texts)) => texts.push(entry.text.clone()),
      None => groups.push((entry.category, vec![entry.text.clone()])),
    }
  }
  groups
}
