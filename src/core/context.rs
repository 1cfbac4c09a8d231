//! Repository context - built once in main.rs, passed to every command
//!
//! Holds the repository root and the component registry. Git and GitHub
//! backends are created per command because their dry-run mode depends on
//! the command's flags.

use crate::core::config::ReleaserConfig;
use crate::core::error::ReleaseResult;
use crate::core::github::GhCli;
use crate::core::vcs::{Git, SystemGit};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RepoContext {
  /// Repository working tree root (absolute path)
  pub root: PathBuf,

  /// Component registry (releaser.toml)
  pub config: ReleaserConfig,
}

impl RepoContext {
  /// Locate the repository containing `cwd` and load its configuration
  pub fn build(cwd: &Path) -> ReleaseResult<Self> {
    let root = SystemGit::open(cwd)?.repo_root()?;
    let config = ReleaserConfig::load(&root)?;
    Ok(Self { root, config })
  }

  /// Git backend rooted at the repository
  pub fn git(&self, dry_run: bool) -> ReleaseResult<SystemGit> {
    Ok(SystemGit::open(&self.root)?.with_dry_run(dry_run))
  }

  /// gh backend running from the repository root
  pub fn github(&self, dry_run: bool) -> GhCli {
    GhCli::new(self.config.github.cli.clone(), &self.root).with_dry_run(dry_run)
  }
}
