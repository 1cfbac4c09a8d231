use crate::core::error::{ConfigError, InputError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Configuration for releaser
/// Searched in order: releaser.toml, .releaser.toml, .config/releaser.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaserConfig {
  #[serde(default)]
  pub repository: RepositoryConfig,
  #[serde(default)]
  pub github: GitHubConfig,
  #[serde(default)]
  pub components: Vec<ComponentConfig>,
}

/// Branch and remote names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
  /// Trunk branch prereleases are cut from (default: "main")
  #[serde(default = "default_trunk")]
  pub trunk: String,

  /// Remote that holds release branches (default: "origin")
  #[serde(default = "default_remote")]
  pub remote: String,
}

fn default_trunk() -> String {
  "main".to_string()
}

fn default_remote() -> String {
  "origin".to_string()
}

impl Default for RepositoryConfig {
  fn default() -> Self {
    Self {
      trunk: default_trunk(),
      remote: default_remote(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
  /// GitHub CLI executable (default: "gh")
  #[serde(default = "default_gh")]
  pub cli: String,
}

fn default_gh() -> String {
  "gh".to_string()
}

impl Default for GitHubConfig {
  fn default() -> Self {
    Self { cli: default_gh() }
  }
}

/// A releasable component of the monorepo
///
/// # Example
///
/// ```toml
/// [[components]]
/// name = "studioctl"
/// changelog = "src/cli/CHANGELOG.md"
///
/// [components.build]
/// command = ["make", "dist"]
/// checksums = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
  /// Lowercase name used in tags and branch names
  pub name: String,

  /// Changelog path relative to the repository root
  pub changelog: String,

  /// Release artifact directory, relative to the repository root
  #[serde(default = "default_output_dir")]
  pub output_dir: PathBuf,

  /// Artifact builder; absent means changelog-only releases
  #[serde(default)]
  pub build: Option<BuildConfig>,
}

fn default_output_dir() -> PathBuf {
  PathBuf::from("build").join("release")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  /// Program and arguments, run from the repository root
  pub command: Vec<String>,

  /// Write SHA256SUMS over the produced files
  #[serde(default)]
  pub checksums: bool,
}

impl ReleaserConfig {
  /// Find config file in search order: releaser.toml, .releaser.toml, .config/releaser.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("releaser.toml"),
      path.join(".releaser.toml"),
      path.join(".config").join("releaser.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from releaser.toml (searches multiple locations)
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      ReleaseError::Config(ConfigError::NotFound {
        repo_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::from_toml(&content).map_err(|e| match e {
      ReleaseError::Config(ConfigError::Parse { message }) => ReleaseError::Config(ConfigError::Parse {
        message: format!("{}: {}", config_path.display(), message),
      }),
      other => other,
    })?;

    log::debug!("loaded {} component(s) from {}", config.components.len(), config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn from_toml(content: &str) -> ReleaseResult<Self> {
    let config: ReleaserConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate component definitions
  pub fn validate(&self) -> ReleaseResult<()> {
    let invalid = |message: String| ReleaseError::Config(ConfigError::Invalid { message });

    if self.repository.trunk.trim().is_empty() || self.repository.remote.trim().is_empty() {
      return Err(invalid("repository.trunk and repository.remote must not be empty".to_string()));
    }

    let mut seen = Vec::with_capacity(self.components.len());
    for component in &self.components {
      let name = component.name.as_str();
      if name.is_empty() || !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(invalid(format!(
          "component name '{}' must match [a-z0-9-]+",
          component.name
        )));
      }
      if seen.contains(&name) {
        return Err(invalid(format!("component '{}' is defined twice", name)));
      }
      seen.push(name);

      if !is_contained_relative(Path::new(&component.changelog)) {
        return Err(invalid(format!(
          "changelog path '{}' for '{}' must be relative to the repository root",
          component.changelog, name
        )));
      }
      if component.output_dir.is_absolute() {
        return Err(invalid(format!(
          "output_dir for '{}' must be relative to the repository root",
          name
        )));
      }
      if let Some(build) = &component.build
        && build.command.is_empty()
      {
        return Err(invalid(format!("build.command for '{}' must not be empty", name)));
      }
    }

    Ok(())
  }

  /// Look up a registered component
  pub fn component(&self, name: &str) -> ReleaseResult<&ComponentConfig> {
    if name.is_empty() {
      return Err(InputError::MissingField { field: "component" }.into());
    }
    self.components.iter().find(|c| c.name == name).ok_or_else(|| {
      InputError::UnknownComponent {
        name: name.to_string(),
        available: self.components.iter().map(|c| c.name.clone()).collect(),
      }
      .into()
    })
  }
}

/// Relative, non-empty, and never climbing out with `..`
fn is_contained_relative(path: &Path) -> bool {
  !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
