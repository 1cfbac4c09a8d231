//! CLI commands for releaser
//!
//! ## Release flow
//! - **prepare**: open the changelog-promotion PR for a version
//! - **workflow**: build and publish a prepared release (CI only)
//! - **backport**: cherry-pick a trunk fix onto a release line
//!
//! ## CI helpers
//! - **validate-changelog**: gate PRs on changelog updates
//! - **resolve-version**: print the version a base branch would release
//! - **notes**: print the release notes for a version
//!
//! All commands accept `&RepoContext` so the repository and config load once.

pub mod backport;
pub mod notes;
pub mod prepare;
pub mod resolve;
pub mod validate;
pub mod workflow;

pub use backport::run_backport;
pub use notes::run_notes;
pub use prepare::run_prepare;
pub use resolve::run_resolve;
pub use validate::run_validate;
pub use workflow::run_workflow;

use crate::ui::prompt::should_prompt;
use crate::ui::{ConsoleLogger, ConsolePrompter, Logger, NopLogger};
use std::io::IsTerminal;

/// Progress output for the run; `--quiet` keeps only errors
pub fn logger(quiet: bool) -> &'static dyn Logger {
  if quiet { &NopLogger } else { &ConsoleLogger }
}

/// Console prompter, unless the run is a dry run, `--yes` was given or
/// stdin is not a terminal
pub(crate) fn console_prompter(dry_run: bool, assume_yes: bool) -> Option<ConsolePrompter> {
  should_prompt(dry_run, assume_yes, std::io::stdin().is_terminal()).then_some(ConsolePrompter)
}
