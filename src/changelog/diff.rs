//! Extract the changelog entries a unified diff adds
//!
//! Only the block for the changelog path is read. Category headers update the
//! running category whatever their diff polarity, so unchanged context lines
//! count too. Entries are taken from added (`+`) list items only.

use super::category::Category;
use super::document::Entry;
use super::parser::{CATEGORY_RE, LIST_ITEM_RE, VERSION_HEADER_RE};
use crate::core::error::ChangelogError;

const DIFF_HEADER: &str = "diff --git";

/// Entries added to `changelog_path` by `diff`
pub fn extract_entries(diff: &str, changelog_path: &str) -> Result<Vec<Entry>, ChangelogError> {
  let block_header = format!("{} a/{}", DIFF_HEADER, changelog_path);
  let start = diff.find(&block_header).ok_or_else(|| ChangelogError::NoChangelogInDiff {
    path: changelog_path.to_string(),
  })?;

  let mut entries = Vec::new();
  let mut current: Option<Category> = None;

  for line in diff[start..].lines() {
    if line.starts_with(DIFF_HEADER) && !line.starts_with(&block_header) {
      break;
    }
    if is_metadata_line(line) {
      continue;
    }

    let added = line.starts_with('+');
    let content = line
      .strip_prefix('+')
      .or_else(|| line.strip_prefix('-'))
      .or_else(|| line.strip_prefix(' '))
      .unwrap_or(line);

    if VERSION_HEADER_RE.is_match(content) {
      current = None;
      continue;
    }

    // Items under a header outside the vocabulary are skipped
    if let Some(caps) = CATEGORY_RE.captures(content) {
      current = Category::from_name(&caps[1]);
      continue;
    }

    if !added {
      continue;
    }
    let Some(category) = current else {
      continue;
    };
    if let Some(caps) = LIST_ITEM_RE.captures(content) {
      entries.push(Entry::new(category, &caps[1]));
    }
  }

  if entries.is_empty() {
    return Err(ChangelogError::NoEntriesInDiff {
      path: changelog_path.to_string(),
    });
  }
  Ok(entries)
}

fn is_metadata_line(line: &str) -> bool {
  ["@@", "---", "+++", "index ", DIFF_HEADER]
    .iter()
    .any(|prefix| line.starts_with(prefix))
}
