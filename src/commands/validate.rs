//! `releaser validate-changelog`

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::release::{GateRequest, validate_changelog};
use crate::ui::Logger;

pub fn run_validate(
  ctx: &RepoContext,
  component: String,
  base: String,
  head: String,
  changelog: Option<String>,
  log: &dyn Logger,
) -> ReleaseResult<()> {
  let component = ctx.config.component(&component)?;
  let git = ctx.git(false)?;

  let request = GateRequest {
    component: component.name.clone(),
    base,
    head,
    changelog_path: changelog.unwrap_or_else(|| component.changelog.clone()),
  };
  validate_changelog(&git, &request, log)?;

  println!("changelog validated");
  Ok(())
}
