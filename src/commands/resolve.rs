//! `releaser resolve-version`

use serde::Serialize;

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::release::{ReleaseTag, resolve_version};

#[derive(Debug, Serialize)]
struct Resolved {
  component: String,
  base_branch: String,
  version: String,
  tag: String,
}

pub fn run_resolve(ctx: &RepoContext, component: String, base_branch: String, json: bool) -> ReleaseResult<()> {
  let component = ctx.config.component(&component)?;
  let version = resolve_version(
    &ctx.root,
    &component.changelog,
    &component.name,
    &base_branch,
    &ctx.config.repository.trunk,
  )?;
  let tag = ReleaseTag {
    component: component.name.clone(),
    version,
  };

  if json {
    let resolved = Resolved {
      component: tag.component.clone(),
      base_branch,
      version: tag.version.to_string(),
      tag: tag.full(),
    };
    println!("{}", serde_json::to_string_pretty(&resolved)?);
  } else {
    println!("{}", tag.version);
  }
  Ok(())
}
