//! `releaser prepare`

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::release::{Prepare, PrepareConfig};
use crate::ui::{Logger, Prompter};

pub struct PrepareArgs {
  pub component: String,
  pub version: String,
  pub changelog: Option<String>,
  pub dry_run: bool,
  pub yes: bool,
  pub open: bool,
}

pub fn run_prepare(ctx: &RepoContext, args: PrepareArgs, log: &dyn Logger) -> ReleaseResult<()> {
  let component = ctx.config.component(&args.component)?;
  let git = ctx.git(args.dry_run)?;
  let github = ctx.github(args.dry_run);
  let prompter = super::console_prompter(args.dry_run, args.yes);

  let config = PrepareConfig {
    component: component.name.clone(),
    version: args.version,
    changelog_path: args.changelog.unwrap_or_else(|| component.changelog.clone()),
    trunk: ctx.config.repository.trunk.clone(),
    remote: ctx.config.repository.remote.clone(),
    dry_run: args.dry_run,
    open: args.open,
  };

  Prepare::new(
    config,
    &git,
    &github,
    prompter.as_ref().map(|p| p as &dyn Prompter),
    log,
  )
  .run()?;
  Ok(())
}
