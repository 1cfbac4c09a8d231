//! Keep a Changelog documents
//!
//! Supports the fixed subset used by release automation: a preamble, one
//! `## [Unreleased]` section, then released `## [x.y.z] - date` sections
//! (newest first) with `###` category headers and `-`/`*` entries.
//!
//! - **parser**: text → [`Changelog`], with category vocabulary and order checks
//! - **validate**: duplicate / order / active-prerelease-line invariants
//! - **diff**: entries added by a unified diff
//! - **transform**: `promote` and `insert_entries`, both returning new documents
//! - **document**: the tree, rendering and read-only queries

pub mod category;
pub mod diff;
pub mod document;
pub mod parser;
pub mod transform;
pub mod validate;
pub mod version;

pub use category::Category;
pub use document::{Changelog, Entry};
pub use parser::{parse, parse_with_diff};
pub use version::Version;
