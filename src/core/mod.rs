//! Core building blocks shared by every release operation
//!
//! - **cancel**: cooperative cancellation between workflow steps
//! - **config**: component registry (releaser.toml) parsing and validation
//! - **context**: repository root + config, built once per invocation
//! - **error**: error taxonomy with contextual help messages and exit codes
//! - **github**: GitHub operations through the `gh` CLI
//! - **vcs**: git operations abstraction (SystemGit)

pub mod cancel;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod vcs;
