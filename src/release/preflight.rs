//! Checks shared by the workflows before they touch branches

use crate::core::error::{PolicyError, ReleaseResult};
use crate::core::vcs::Git;
use crate::ui::Logger;

/// Fail with [`PolicyError::DirtyWorkingTree`] on uncommitted changes
pub fn ensure_clean_tree(git: &dyn Git, log: &dyn Logger) -> ReleaseResult<()> {
  if git.working_tree_clean()? {
    return Ok(());
  }

  log.error("Working tree has uncommitted changes");
  log.error("Commit or stash changes before releasing:");
  log.error("  git add -A && git commit -m 'your message'");
  log.error("  or: git stash push -u");
  Err(PolicyError::DirtyWorkingTree.into())
}

/// `git fetch <remote> <branch>` then `git show <remote>/<branch>:<path>`
pub fn read_remote_file(git: &dyn Git, remote: &str, branch: &str, path: &str) -> ReleaseResult<String> {
  git.fetch(remote, branch)?;
  git.show_file(&format!("{}/{}", remote, branch), path)
}
