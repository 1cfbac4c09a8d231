//! CI changelog gate for pull requests
//!
//! A change passes when the changelog was touched in `base..head` and either
//! Unreleased gained an entry, or the change is a release promotion that moved
//! Unreleased entries into a new released section.

use std::collections::HashSet;
use std::fs;

use crate::changelog::{self, Changelog, Entry};
use crate::core::error::{ChangelogError, PolicyError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::vcs::Git;
use crate::ui::Logger;

/// Inputs for one gate check
#[derive(Debug, Clone)]
pub struct GateRequest {
  pub component: String,
  pub base: String,
  pub head: String,
  pub changelog_path: String,
}

/// Run the gate; the head document is read from the working tree
pub fn validate_changelog(git: &dyn Git, request: &GateRequest, log: &dyn Logger) -> ReleaseResult<()> {
  let path = &request.changelog_path;
  log.step(&format!("Validating changelog for {}", request.component));
  log.detail("Changelog", path);
  log.detail("Range", &format!("{}..{}", request.base, request.head));

  let changed = git.changed_paths(&request.base, &request.head).context("git diff")?;
  if !changed.iter().any(|p| p == path) {
    return Err(PolicyError::ChangelogNotModified { path: path.clone() }.into());
  }

  let file = git.repo_root()?.join(path);
  let content = fs::read_to_string(&file).map_err(|e| ReleaseError::file(&file, e))?;
  let head = changelog::parse(&content)?;
  let base = load_base(git, &request.base, path)?;

  check_unreleased_or_promotion(&base, &head, path)?;
  log.success("Changelog validated");
  Ok(())
}

/// Base document at `rev`; a changelog that does not exist yet reads as empty
fn load_base(git: &dyn Git, rev: &str, path: &str) -> ReleaseResult<Changelog> {
  if !git.file_exists_at(rev, path)? {
    log::debug!("{} absent at {}, comparing against an empty changelog", path, rev);
    return Ok(Changelog::default());
  }
  let content = git.show_file(rev, path).context("load base changelog")?;
  Ok(changelog::parse(&content)?)
}

/// Decide whether `head` is an acceptable successor of `base`
pub fn check_unreleased_or_promotion(base: &Changelog, head: &Changelog, path: &str) -> ReleaseResult<()> {
  match head.validate_unreleased() {
    Ok(()) => {
      let base_entries = unreleased_entries(base);
      if unreleased_entries(head).difference(&base_entries).next().is_some() {
        Ok(())
      } else {
        Err(PolicyError::NoNewUnreleasedEntries { path: path.to_string() }.into())
      }
    }
    Err(e @ (ChangelogError::UnreleasedNoHeader | ChangelogError::UnreleasedNoEntry)) => {
      if is_release_promotion(base, head) {
        Ok(())
      } else {
        Err(e.into())
      }
    }
    Err(e) => Err(e.into()),
  }
}

/// Base Unreleased was non-empty, head dropped some of it, and a section new
/// in head holds at least one dropped entry
fn is_release_promotion(base: &Changelog, head: &Changelog) -> bool {
  let base_entries = unreleased_entries(base);
  if base_entries.is_empty() {
    return false;
  }

  let head_entries = unreleased_entries(head);
  let removed: HashSet<&Entry> = base_entries.difference(&head_entries).collect();
  if removed.is_empty() {
    return false;
  }

  head
    .releases
    .iter()
    .filter(|release| !base.has_version(&release.version.num()))
    .flat_map(|release| release.entries())
    .any(|entry| removed.contains(&entry))
}

fn unreleased_entries(doc: &Changelog) -> HashSet<Entry> {
  doc
    .unreleased
    .as_ref()
    .map(|u| u.entries().collect())
    .unwrap_or_default()
}
