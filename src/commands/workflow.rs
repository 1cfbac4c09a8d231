//! `releaser workflow`
//!
//! Resolves the version from the base branch, then hands off to the release
//! state machine. Publishing is CI-only; `--dry-run` works anywhere.

use std::env;

use crate::core::context::RepoContext;
use crate::core::error::{InputError, ReleaseResult};
use crate::release::fs::resolve_output_dir;
use crate::release::{Builder, CommandBuilder, Workflow, WorkflowConfig, resolve_version};
use crate::ui::Logger;

pub fn run_workflow(
  ctx: &RepoContext,
  component: String,
  base_branch: String,
  dry_run: bool,
  skip_branch_check: bool,
  log: &dyn Logger,
) -> ReleaseResult<()> {
  if !dry_run && !is_ci() {
    return Err(InputError::RequiresCi.into());
  }

  let component = ctx.config.component(&component)?;
  let trunk = &ctx.config.repository.trunk;
  let version = resolve_version(&ctx.root, &component.changelog, &component.name, &base_branch, trunk)?;
  let output_dir = resolve_output_dir(&ctx.root, &component.output_dir)?;

  let git = ctx.git(dry_run)?;
  let github = ctx.github(dry_run);
  let builder = component.build.as_ref().map(|build| CommandBuilder::new(build, &ctx.root));

  let config = WorkflowConfig {
    component: component.name.clone(),
    version: version.to_string(),
    changelog_path: component.changelog.clone(),
    output_dir,
    trunk: trunk.clone(),
    remote: ctx.config.repository.remote.clone(),
    dry_run,
    draft: true,
    skip_branch_check,
  };

  Workflow::new(
    config,
    &git,
    &github,
    builder.as_ref().map(|b| b as &dyn Builder),
    log,
  )
  .run()
}

fn is_ci() -> bool {
  env::var("CI").is_ok_and(|value| value == "true")
}
