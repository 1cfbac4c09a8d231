//! Per-component artifact builders
//!
//! A builder turns a version into files inside the output directory. The
//! workflow uploads whatever ends up there, so builders only need to report
//! what they produced.

use crate::changelog::Version;
use crate::core::config::BuildConfig;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::release::component::RELEASE_NOTES_FILE;
use crate::release::fs::list_files;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the checksum manifest
pub const CHECKSUMS_FILE: &str = "SHA256SUMS";

pub trait Builder {
  /// Build release artifacts for `version` into `output_dir`
  fn build(&self, version: &Version, output_dir: &Path) -> ReleaseResult<Vec<PathBuf>>;
}

/// Runs the configured command from the repository root
///
/// The command sees `RELEASE_VERSION` (e.g. `v1.2.3`) and
/// `RELEASE_OUTPUT_DIR` in its environment.
pub struct CommandBuilder {
  command: Vec<String>,
  workdir: PathBuf,
  checksums: bool,
}

impl CommandBuilder {
  pub fn new(config: &BuildConfig, workdir: &Path) -> Self {
    Self {
      command: config.command.clone(),
      workdir: workdir.to_path_buf(),
      checksums: config.checksums,
    }
  }
}

impl Builder for CommandBuilder {
  fn build(&self, version: &Version, output_dir: &Path) -> ReleaseResult<Vec<PathBuf>> {
    let Some((program, args)) = self.command.split_first() else {
      return Err(ReleaseError::message("build command is empty"));
    };
    let display = self.command.join(" ");
    log::debug!("build: {} (RELEASE_VERSION={})", display, version);

    let status = Command::new(program)
      .args(args)
      .current_dir(&self.workdir)
      .env("RELEASE_VERSION", version.to_string())
      .env("RELEASE_OUTPUT_DIR", output_dir)
      .status()
      .with_context(|| format!("Failed to execute {}", display))?;

    if !status.success() {
      return Err(ReleaseError::Build {
        command: display,
        detail: format!("exited with {}", status),
      });
    }

    let mut artifacts: Vec<PathBuf> = list_files(output_dir)?
      .into_iter()
      .filter(|p| !is_named(p, RELEASE_NOTES_FILE) && !is_named(p, CHECKSUMS_FILE))
      .collect();

    if self.checksums && !artifacts.is_empty() {
      artifacts.push(write_checksums(output_dir, &artifacts)?);
    }
    Ok(artifacts)
  }
}

fn is_named(path: &Path, name: &str) -> bool {
  path.file_name().is_some_and(|n| n == name)
}

/// Write `SHA256SUMS` for `files`, one `<hex>  <name>` line each, sorted by name
pub fn write_checksums(output_dir: &Path, files: &[PathBuf]) -> ReleaseResult<PathBuf> {
  let mut lines = Vec::with_capacity(files.len());
  for file in files {
    let name = file
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| ReleaseError::message(format!("not a file: {}", file.display())))?;
    lines.push((name, sha256_file(file)?));
  }
  lines.sort();

  let body: String = lines
    .iter()
    .map(|(name, hex)| format!("{}  {}\n", hex, name))
    .collect();
  let path = output_dir.join(CHECKSUMS_FILE);
  fs::write(&path, body).map_err(|e| ReleaseError::file(&path, e))?;
  Ok(path)
}

fn sha256_file(path: &Path) -> ReleaseResult<String> {
  let mut file = fs::File::open(path).map_err(|e| ReleaseError::file(path, e))?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];
  loop {
    let n = file.read(&mut buffer).map_err(|e| ReleaseError::file(path, e))?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }
  Ok(format!("{:x}", hasher.finalize()))
}
