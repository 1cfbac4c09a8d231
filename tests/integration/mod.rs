//! Integration tests for the releaser binary
//!
//! Each test builds a throwaway git repository with a bare `origin` remote and
//! drives the binary against it. Nothing here talks to GitHub: publishing
//! paths run with `--dry-run`.

mod helpers;
mod test_backport;
mod test_notes;
mod test_prepare;
mod test_validate;
mod test_workflow;
