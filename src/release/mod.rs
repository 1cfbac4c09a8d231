//! Release workflows and the helpers they share
//!
//! - **workflow**: publish a release that `prepare` already put in the changelog
//! - **prepare**: open the PR that promotes Unreleased to a version
//! - **backport**: carry a trunk fix onto a `release/<component>/vX.Y` line
//! - **gate**: CI check that a PR touched the changelog properly
//! - **resolver**: pick the version CI should release for a base branch
//!
//! Each workflow is a sequential state machine over the [`Git`] and
//! [`GitHub`] collaborators; the first failing step ends the run.
//!
//! [`Git`]: crate::core::vcs::Git
//! [`GitHub`]: crate::core::github::GitHub

pub mod backport;
pub mod builder;
pub mod component;
pub mod fs;
pub mod gate;
pub mod preflight;
pub mod prepare;
pub mod resolver;
pub mod workflow;

#[cfg(test)]
pub mod testing;

pub use backport::{Backport, BackportConfig};
pub use builder::{Builder, CommandBuilder};
pub use component::ReleaseTag;
pub use gate::{GateRequest, validate_changelog};
pub use prepare::{Prepare, PrepareConfig};
pub use resolver::resolve_version;
pub use workflow::{Workflow, WorkflowConfig};
