//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const CHANGELOG: &str = "src/cli/CHANGELOG.md";

/// A repository with a bare `origin`, a `releaser.toml` and one component
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repository whose first commit holds `changelog`
  pub fn new(changelog: &str) -> Result<Self> {
    Self::with_config(changelog, "")
  }

  /// Same as [`TestRepo::new`], with extra TOML appended to the component
  pub fn with_config(changelog: &str, component_extra: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let origin = root.path().join("origin.git");
    let path = root.path().join("work");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--initial-branch=main", path_str(&origin)?])?;
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", path_str(&origin)?])?;

    std::fs::write(
      path.join("releaser.toml"),
      format!(
        r#"[repository]
trunk = "main"
remote = "origin"

[[components]]
name = "studioctl"
changelog = "{}"
{}"#,
        CHANGELOG, component_extra
      ),
    )?;
    std::fs::write(path.join(".gitignore"), "build/\n")?;

    let repo = Self { _root: root, path };
    repo.write(CHANGELOG, changelog)?;
    repo.commit("Initial commit")?;
    git(&repo.path, &["push", "-u", "origin", "main"])?;
    Ok(repo)
  }

  /// Write a file relative to the repository root
  pub fn write(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Read a file relative to the repository root
  pub fn read(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }

  /// Stage everything and commit; returns the new SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn current_branch(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create `branch` at HEAD on origin without switching to it
  pub fn push_branch(&self, branch: &str) -> Result<()> {
    git(&self.path, &["push", "origin", &format!("HEAD:refs/heads/{}", branch)])?;
    Ok(())
  }

  pub fn remote_branches(&self) -> Result<String> {
    let output = git(&self.path, &["ls-remote", "--heads", "origin"])?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

fn path_str(path: &Path) -> Result<&str> {
  path.to_str().context("temp path is not UTF-8")
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the releaser binary; the caller inspects the exit status
pub fn run_releaser(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_releaser"))
    .current_dir(cwd)
    .args(args)
    .env_remove("CI")
    .output()
    .context("Failed to run releaser")
}

/// Run the releaser binary and fail unless it exits successfully
pub fn run_releaser_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_releaser(cwd, args)?;
  if !output.status.success() {
    anyhow::bail!(
      "releaser command failed: releaser {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }
  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
