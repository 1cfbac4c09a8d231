//! Error types for releaser with contextual messages and exit codes
//!
//! Errors are grouped into a closed taxonomy so callers can branch on the
//! class of failure rather than on individual messages:
//! - **input**: missing fields, malformed versions, unknown components
//! - **document**: changelog parse and invariant violations
//! - **policy**: branch, tag and changelog-section rules
//! - **external**: git / gh / filesystem failures
//! - **declined**: the operator said no to a confirmation
//!
//! Every error can carry a help message that names the corrective command.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::changelog::Category;

/// Exit codes for releaser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, unknown component)
  User = 1,
  /// System error (git, gh, I/O)
  System = 2,
  /// Changelog or release policy violation
  Validation = 3,
  /// Operator declined a confirmation
  Declined = 4,
  /// Run was cancelled before completion
  Cancelled = 130,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Taxonomy class of a [`ReleaseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Input,
  Document,
  Policy,
  External,
  Declined,
  Cancelled,
}

/// Main error type for releaser
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors (releaser.toml)
  Config(ConfigError),

  /// Bad user input
  Input(InputError),

  /// Changelog document errors
  Changelog(ChangelogError),

  /// Release policy violations
  Policy(PolicyError),

  /// Git operation errors
  Git(GitError),

  /// GitHub CLI errors
  GitHub(GitHubError),

  /// Artifact build command failed
  Build { command: String, detail: String },

  /// I/O errors
  Io(io::Error),

  /// I/O error on a known file
  File { path: PathBuf, source: io::Error },

  /// A confirmation prompt was declined
  Declined { action: String },

  /// The run was cancelled between steps
  Cancelled,

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Wrap an I/O error with the file it happened on
  pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
    ReleaseError::File {
      path: path.into(),
      source,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(source) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, source),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Taxonomy class of this error
  pub fn kind(&self) -> ErrorKind {
    match self {
      ReleaseError::Config(_) | ReleaseError::Input(_) | ReleaseError::Message { .. } => ErrorKind::Input,
      ReleaseError::Changelog(e) => e.kind(),
      ReleaseError::Policy(_) => ErrorKind::Policy,
      ReleaseError::Git(_)
      | ReleaseError::GitHub(_)
      | ReleaseError::Build { .. }
      | ReleaseError::Io(_)
      | ReleaseError::File { .. } => ErrorKind::External,
      ReleaseError::Declined { .. } => ErrorKind::Declined,
      ReleaseError::Cancelled => ErrorKind::Cancelled,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self.kind() {
      ErrorKind::Input => ExitCode::User,
      ErrorKind::Document | ErrorKind::Policy => ExitCode::Validation,
      ErrorKind::External => ExitCode::System,
      ErrorKind::Declined => ExitCode::Declined,
      ErrorKind::Cancelled => ExitCode::Cancelled,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Input(e) => e.help_message(),
      ReleaseError::Changelog(e) => e.help_message(),
      ReleaseError::Policy(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Input(e) => write!(f, "{}", e),
      ReleaseError::Changelog(e) => write!(f, "{}", e),
      ReleaseError::Policy(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::GitHub(e) => write!(f, "{}", e),
      ReleaseError::Build { command, detail } => write!(f, "build failed: {}\n{}", command, detail.trim_end()),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::File { path, source } => write!(f, "{}: {}", path.display(), source),
      ReleaseError::Declined { action } => write!(f, "action not confirmed: {}", action),
      ReleaseError::Cancelled => write!(f, "release run cancelled"),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::File { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ChangelogError> for ReleaseError {
  fn from(err: ChangelogError) -> Self {
    ReleaseError::Changelog(err)
  }
}

impl From<InputError> for ReleaseError {
  fn from(err: InputError) -> Self {
    ReleaseError::Input(err)
  }
}

impl From<PolicyError> for ReleaseError {
  fn from(err: PolicyError) -> Self {
    ReleaseError::Policy(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<GitHubError> for ReleaseError {
  fn from(err: GitHubError) -> Self {
    ReleaseError::GitHub(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::Config(ConfigError::Parse {
      message: err.to_string(),
    })
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// releaser.toml not found
  NotFound { repo_root: PathBuf },

  /// releaser.toml could not be deserialized
  Parse { message: String },

  /// Semantic problem in an otherwise well-formed file
  Invalid { message: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Create releaser.toml at the repository root, e.g.:\n\n  [[components]]\n  name = \"mytool\"\n  changelog = \"src/mytool/CHANGELOG.md\"".to_string(),
      ),
      ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
        Some("Fix releaser.toml and re-run the command.".to_string())
      }
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { repo_root } => {
        write!(
          f,
          "No releaser configuration found.\nSearched releaser.toml, .releaser.toml and .config/releaser.toml under {}",
          repo_root.display()
        )
      }
      ConfigError::Parse { message } => write!(f, "Invalid releaser.toml: {}", message),
      ConfigError::Invalid { message } => write!(f, "Invalid releaser.toml: {}", message),
    }
  }
}

/// Bad or missing user input
#[derive(Debug)]
pub enum InputError {
  /// A required argument was empty
  MissingField { field: &'static str },

  /// Component is not registered in releaser.toml
  UnknownComponent { name: String, available: Vec<String> },

  /// Base branch is neither trunk nor release/<component>/vX.Y
  InvalidBaseBranch { branch: String, trunk: String },

  /// Release branch names a different component
  ComponentMismatch { branch: String, component: String },

  /// Backport target is not vX.Y
  InvalidReleaseLine { value: String },

  /// Non-dry-run workflow outside CI
  RequiresCi,

  /// Output directory is not strictly inside the repository
  UnsafeOutputDir { path: PathBuf, reason: String },
}

impl InputError {
  fn help_message(&self) -> Option<String> {
    match self {
      InputError::UnknownComponent { available, .. } if !available.is_empty() => {
        Some(format!("Registered components: {}", available.join(", ")))
      }
      InputError::InvalidBaseBranch { trunk, .. } => Some(format!(
        "Use '{}' for prereleases or 'release/<component>/vX.Y' for stable releases.",
        trunk
      )),
      InputError::InvalidReleaseLine { .. } => Some("Pass the release line as vMAJOR.MINOR, e.g. --branch v1.2".to_string()),
      InputError::RequiresCi => Some("Run with --dry-run for local validation.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for InputError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InputError::MissingField { field } => write!(f, "{} is required", field),
      InputError::UnknownComponent { name, .. } => write!(f, "unknown component: {}", name),
      InputError::InvalidBaseBranch { branch, trunk } => {
        write!(
          f,
          "invalid base branch format: {} (expected {} or release/<component>/vX.Y)",
          branch, trunk
        )
      }
      InputError::ComponentMismatch { branch, component } => {
        write!(f, "base branch {} does not belong to component {}", branch, component)
      }
      InputError::InvalidReleaseLine { value } => {
        write!(f, "invalid branch version format (expected vX.Y): {}", value)
      }
      InputError::RequiresCi => write!(f, "workflow command may only run in CI (CI=true)"),
      InputError::UnsafeOutputDir { path, reason } => {
        write!(f, "unsafe output directory {}: {}", path.display(), reason)
      }
    }
  }
}

/// Changelog document errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogError {
  /// Text is not vMAJOR.MINOR.PATCH[-prerelease]
  InvalidVersion { value: String },

  /// Release date is not YYYY-MM-DD
  InvalidDate { value: String },

  /// Category header outside the vocabulary
  InvalidCategory { name: String },

  /// Category header out of vocabulary order within a section
  CategoryOrder { category: Category, after: Category },

  /// Two released sections share a version
  DuplicateVersion { version: String },

  /// A section outranks the one above it
  VersionOrder { version: String, after: String },

  /// More than one active prerelease line at the top
  PrereleaseConflict { first: (u64, u64), second: (u64, u64) },

  NoUnreleased,
  UnreleasedNoHeader,
  UnreleasedNoEntry,

  /// Promotion would produce an empty section
  UnreleasedEmpty,

  VersionExists { version: String },
  VersionNotFound { version: String },

  /// The diff has no block for the changelog path
  NoChangelogInDiff { path: String },

  /// The changelog block added no entries
  NoEntriesInDiff { path: String },

  NoReleasedVersions,
  /// Released versions exist but none satisfy the query
  NoMatchingVersion { wanted: String },
}

impl ChangelogError {
  /// Malformed versions are input errors, everything else is a document error
  pub fn kind(&self) -> ErrorKind {
    match self {
      ChangelogError::InvalidVersion { .. } => ErrorKind::Input,
      _ => ErrorKind::Document,
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ChangelogError::InvalidCategory { .. } | ChangelogError::CategoryOrder { .. } => {
        Some(format!("Categories must be one of, in this order: {}", Category::vocabulary()))
      }
      ChangelogError::UnreleasedNoHeader | ChangelogError::UnreleasedNoEntry => Some(
        "Add an entry under ## [Unreleased], e.g.:\n\n  ### Fixed\n  - Describe the change".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ChangelogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangelogError::InvalidVersion { value } => write!(f, "invalid version format: {:?}", value),
      ChangelogError::InvalidDate { value } => write!(f, "invalid release date: {:?}", value),
      ChangelogError::InvalidCategory { name } => {
        write!(f, "invalid category {:?} (valid categories: {})", name, Category::vocabulary())
      }
      ChangelogError::CategoryOrder { category, after } => {
        write!(f, "invalid category order: {} appears after {}", category, after)
      }
      ChangelogError::DuplicateVersion { version } => write!(f, "duplicate version in changelog: {}", version),
      ChangelogError::VersionOrder { version, after } => {
        write!(f, "invalid version order: {} appears after {}", version, after)
      }
      ChangelogError::PrereleaseConflict { first, second } => write!(
        f,
        "multiple active prerelease lines: saw v{}.{} and v{}.{} at top of changelog",
        first.0, first.1, second.0, second.1
      ),
      ChangelogError::NoUnreleased => write!(f, "no [Unreleased] section found"),
      ChangelogError::UnreleasedNoHeader => write!(f, "[Unreleased] section has no category headers"),
      ChangelogError::UnreleasedNoEntry => write!(f, "[Unreleased] section has no entries"),
      ChangelogError::UnreleasedEmpty => write!(f, "[Unreleased] section is empty, nothing to release"),
      ChangelogError::VersionExists { version } => write!(f, "version already exists in changelog: {}", version),
      ChangelogError::VersionNotFound { version } => write!(f, "version not found in changelog: {}", version),
      ChangelogError::NoChangelogInDiff { path } => write!(f, "no changelog in diff: {}", path),
      ChangelogError::NoEntriesInDiff { path } => write!(f, "no entries in diff: {}", path),
      ChangelogError::NoReleasedVersions => write!(f, "no released versions in changelog"),
      ChangelogError::NoMatchingVersion { wanted } => {
        write!(f, "no released version matching {}", wanted)
      }
    }
  }
}

impl std::error::Error for ChangelogError {}

/// Release policy violations
#[derive(Debug)]
pub enum PolicyError {
  TagExists { tag: String },

  /// Prerelease attempted off the trunk branch
  WrongBranch { expected: String, actual: String },

  ReleaseBranchMissing { branch: String },
  ReleaseBranchExists { branch: String },

  DirtyWorkingTree,

  /// The changelog has no section for the version being released
  ChangelogSectionMissing {
    component: String,
    version: String,
    path: String,
  },

  ChangelogNotModified { path: String },
  NoNewUnreleasedEntries { path: String },

  NoBackportEntries { commit: String },

  /// Cherry-pick conflicted outside the changelog
  BackportConflict { paths: Vec<String> },

  /// Refused to clean a directory that could be a root
  UnsafeCleanPath { path: PathBuf },
}

impl PolicyError {
  fn help_message(&self) -> Option<String> {
    match self {
      PolicyError::TagExists { .. } => Some("Tags are immutable; release a new patch version instead.".to_string()),
      PolicyError::WrongBranch { expected, .. } => Some(format!(
        "Check out {} or pass --skip-branch-check (unsafe).",
        expected
      )),
      PolicyError::ReleaseBranchMissing { .. } => {
        Some("Prepare the first stable release (vX.Y.0) to create the release branch.".to_string())
      }
      PolicyError::ReleaseBranchExists { .. } => Some("Use a patch version (vX.Y.Z with Z > 0).".to_string()),
      PolicyError::DirtyWorkingTree => {
        Some("Commit your changes or stash them with: git stash push -u".to_string())
      }
      PolicyError::ChangelogSectionMissing { component, version, .. } => Some(format!(
        "Run: releaser prepare --component {} --version {}",
        component, version
      )),
      PolicyError::NoNewUnreleasedEntries { .. } => {
        Some("Add a new entry under ## [Unreleased] describing this change.".to_string())
      }
      PolicyError::BackportConflict { .. } => {
        Some("Resolve the backport by hand: cherry-pick the commit onto the release branch manually.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for PolicyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolicyError::TagExists { tag } => write!(f, "tag already exists: {}", tag),
      PolicyError::WrongBranch { expected, actual } => {
        write!(f, "prerelease must be created from {} (current: {})", expected, actual)
      }
      PolicyError::ReleaseBranchMissing { branch } => write!(f, "release branch does not exist: {}", branch),
      PolicyError::ReleaseBranchExists { branch } => {
        write!(f, "release branch already exists; use patch version: {}", branch)
      }
      PolicyError::DirtyWorkingTree => write!(f, "working tree has uncommitted changes"),
      PolicyError::ChangelogSectionMissing { version, path, .. } => {
        write!(f, "changelog {} has no section for {}", path, version)
      }
      PolicyError::ChangelogNotModified { path } => write!(f, "changelog not modified: {}", path),
      PolicyError::NoNewUnreleasedEntries { path } => {
        write!(f, "no new [Unreleased] entries in {}", path)
      }
      PolicyError::NoBackportEntries { commit } => write!(f, "no changelog entries found in commit {}", commit),
      PolicyError::BackportConflict { paths } => {
        write!(f, "cherry-pick conflicts outside the changelog: {}", paths.join(", "))
      }
      PolicyError::UnsafeCleanPath { path } => {
        write!(f, "refusing to clean unsafe directory path: {}", path.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { stderr, .. } if stderr.contains("non-fast-forward") => {
        Some("The remote has commits you don't have. Pull first.".to_string())
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run releaser from inside the repository (looked at {})",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// GitHub CLI errors
#[derive(Debug)]
pub enum GitHubError {
  /// gh command failed
  CommandFailed { command: String, stderr: String },

  /// gh pr create succeeded but printed no URL
  MissingPrUrl,
}

impl fmt::Display for GitHubError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitHubError::CommandFailed { command, stderr } => {
        write!(f, "gh command failed: {}\n{}", command, stderr.trim_end())
      }
      GitHubError::MissingPrUrl => write!(f, "could not determine pull request URL from gh output"),
    }
  }
}

/// Result type alias for releaser
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(err.to_string())
  }
}
