mod changelog;
mod commands;
mod core;
mod release;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{ReleaseError, print_error};

/// Changelog-driven releases for multi-component repositories
#[derive(Parser)]
#[command(name = "releaser")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Only print errors
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Release flow
  // ============================================================================
  /// Create a changelog promotion PR for a release
  ///
  /// vX.Y.Z-preview.N targets trunk; vX.Y.0 cuts release/<component>/vX.Y
  /// and targets it; vX.Y.Z (Z>0) targets the existing release branch.
  #[command(disable_version_flag = true)]
  Prepare {
    /// Component name (e.g. studioctl)
    #[arg(long)]
    component: String,
    /// Version to release (e.g. v1.2.3)
    #[arg(long)]
    version: String,
    /// Override the component's changelog path
    #[arg(long)]
    changelog: Option<String>,
    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,
    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,
    /// Open the created PR in the browser
    #[arg(long)]
    open: bool,
  },

  /// Run the release workflow (CI only unless --dry-run)
  ///
  /// The version comes from the changelog: trunk releases the latest
  /// prerelease, release/<component>/vX.Y the latest stable on that line.
  Workflow {
    /// Component name
    #[arg(long)]
    component: String,
    /// Base branch (trunk or release/<component>/vX.Y)
    #[arg(long)]
    base_branch: String,
    /// Validate and build without creating the release
    #[arg(long)]
    dry_run: bool,
    /// Skip the branch requirement (unsafe)
    #[arg(long)]
    skip_branch_check: bool,
  },

  /// Cherry-pick a commit onto a release branch with changelog handling
  Backport {
    /// Component name
    #[arg(long)]
    component: String,
    /// Commit SHA to backport
    #[arg(long)]
    commit: String,
    /// Target release line (e.g. v1.2)
    #[arg(long)]
    branch: String,
    /// Override the component's changelog path
    #[arg(long)]
    changelog: Option<String>,
    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,
    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,
    /// Open the created PR in the browser
    #[arg(long)]
    open: bool,
  },

  // ============================================================================
  // CI helpers
  // ============================================================================
  /// Check that a PR updated the changelog or is a release promotion
  ValidateChangelog {
    /// Component name
    #[arg(long)]
    component: String,
    /// Base commit SHA
    #[arg(long)]
    base: String,
    /// Head commit SHA
    #[arg(long)]
    head: String,
    /// Override the component's changelog path
    #[arg(long)]
    changelog: Option<String>,
  },

  /// Print the version a base branch would release
  ResolveVersion {
    /// Component name
    #[arg(long)]
    component: String,
    /// Base branch (trunk or release/<component>/vX.Y)
    #[arg(long)]
    base_branch: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print the release notes for a version
  #[command(disable_version_flag = true)]
  Notes {
    /// Component name
    #[arg(long)]
    component: String,
    /// Version (e.g. v1.2.3)
    #[arg(long)]
    version: String,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  env_logger::init();
  let cli = Cli::parse();

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(e.into()),
  };

  // Every command needs the repository root and the component registry
  let ctx = match core::context::RepoContext::build(&cwd) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let log = commands::logger(cli.quiet);
  let result = match cli.command {
    Commands::Prepare {
      component,
      version,
      changelog,
      dry_run,
      yes,
      open,
    } => commands::run_prepare(
      &ctx,
      commands::prepare::PrepareArgs {
        component,
        version,
        changelog,
        dry_run,
        yes,
        open,
      },
      log,
    ),
    Commands::Workflow {
      component,
      base_branch,
      dry_run,
      skip_branch_check,
    } => commands::run_workflow(&ctx, component, base_branch, dry_run, skip_branch_check, log),
    Commands::Backport {
      component,
      commit,
      branch,
      changelog,
      dry_run,
      yes,
      open,
    } => commands::run_backport(
      &ctx,
      commands::backport::BackportArgs {
        component,
        commit,
        branch,
        changelog,
        dry_run,
        yes,
        open,
      },
      log,
    ),

    Commands::ValidateChangelog {
      component,
      base,
      head,
      changelog,
    } => commands::run_validate(&ctx, component, base, head, changelog, log),
    Commands::ResolveVersion {
      component,
      base_branch,
      json,
    } => commands::run_resolve(&ctx, component, base_branch, json),
    Commands::Notes { component, version } => commands::run_notes(&ctx, component, version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
