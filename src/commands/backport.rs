//! `releaser backport`

use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::release::{Backport, BackportConfig};
use crate::ui::{Logger, Prompter};

pub struct BackportArgs {
  pub component: String,
  pub commit: String,
  pub branch: String,
  pub changelog: Option<String>,
  pub dry_run: bool,
  pub yes: bool,
  pub open: bool,
}

pub fn run_backport(ctx: &RepoContext, args: BackportArgs, log: &dyn Logger) -> ReleaseResult<()> {
  let component = ctx.config.component(&args.component)?;
  let git = ctx.git(args.dry_run)?;
  let github = ctx.github(args.dry_run);
  let prompter = super::console_prompter(args.dry_run, args.yes);

  let config = BackportConfig {
    component: component.name.clone(),
    commit: args.commit,
    line: args.branch,
    changelog_path: args.changelog.unwrap_or_else(|| component.changelog.clone()),
    trunk: ctx.config.repository.trunk.clone(),
    remote: ctx.config.repository.remote.clone(),
    dry_run: args.dry_run,
    open: args.open,
  };

  Backport::new(
    config,
    &git,
    &github,
    prompter.as_ref().map(|p| p as &dyn Prompter),
    log,
  )
  .run()?;
  Ok(())
}
