//! `releaser notes`

use std::fs;

use crate::changelog;
use crate::core::context::RepoContext;
use crate::core::error::{ReleaseError, ReleaseResult};

pub fn run_notes(ctx: &RepoContext, component: String, version: String) -> ReleaseResult<()> {
  let component = ctx.config.component(&component)?;
  let path = ctx.root.join(&component.changelog);
  let content = fs::read_to_string(&path).map_err(|e| ReleaseError::file(&path, e))?;

  let notes = changelog::parse(&content)?.extract_notes(&version)?;
  println!("{}", notes);
  Ok(())
}
