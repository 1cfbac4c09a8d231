//! Output directory handling
//!
//! The output directory is emptied before every build, so it must resolve
//! strictly inside the repository even through symlinks.

use crate::core::error::{InputError, PolicyError, ReleaseError, ReleaseResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve `configured` against `repo_root` and check it stays inside
///
/// Symlinks are resolved on the nearest existing ancestor, so the directory
/// itself does not have to exist yet.
pub fn resolve_output_dir(repo_root: &Path, configured: &Path) -> ReleaseResult<PathBuf> {
  let unsafe_dir = |reason: &str| {
    ReleaseError::Input(InputError::UnsafeOutputDir {
      path: configured.to_path_buf(),
      reason: reason.to_string(),
    })
  };

  let root = fs::canonicalize(repo_root).map_err(|e| ReleaseError::file(repo_root, e))?;
  let joined = if configured.is_absolute() {
    configured.to_path_buf()
  } else {
    repo_root.join(configured)
  };
  let resolved = resolve_with_existing_parent(&lexical_clean(&joined))?;

  match resolved.strip_prefix(&root) {
    Ok(rel) if rel.as_os_str().is_empty() => Err(unsafe_dir("is the repository root")),
    Ok(_) => Ok(resolved),
    Err(_) => Err(unsafe_dir("resolves outside the repository")),
  }
}

/// Drop `.` and fold `..` without touching the filesystem
fn lexical_clean(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        if !out.pop() {
          out.push("..");
        }
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}

fn resolve_with_existing_parent(path: &Path) -> ReleaseResult<PathBuf> {
  let mut current = path.to_path_buf();
  let mut missing = Vec::new();

  loop {
    match fs::symlink_metadata(&current) {
      Ok(_) => {
        let mut resolved = fs::canonicalize(&current).map_err(|e| ReleaseError::file(&current, e))?;
        for part in missing.iter().rev() {
          resolved.push(part);
        }
        return Ok(resolved);
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        let (Some(parent), Some(name)) = (current.parent(), current.file_name()) else {
          return Err(ReleaseError::message(format!(
            "no existing parent directory for {}",
            path.display()
          )));
        };
        missing.push(name.to_os_string());
        current = parent.to_path_buf();
      }
      Err(e) => return Err(ReleaseError::file(&current, e)),
    }
  }
}

/// Create `path` and its parents if missing
pub fn ensure_dir(path: &Path) -> ReleaseResult<()> {
  fs::create_dir_all(path).map_err(|e| ReleaseError::file(path, e))
}

/// Create `path` if missing and remove everything inside it
pub fn clean_dir(path: &Path) -> ReleaseResult<()> {
  if is_unsafe_clean_path(path) {
    return Err(PolicyError::UnsafeCleanPath {
      path: path.to_path_buf(),
    }
    .into());
  }

  ensure_dir(path)?;
  for entry in fs::read_dir(path).map_err(|e| ReleaseError::file(path, e))? {
    let entry = entry.map_err(|e| ReleaseError::file(path, e))?;
    let target = entry.path();
    let removed = if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
      fs::remove_dir_all(&target)
    } else {
      fs::remove_file(&target)
    };
    removed.map_err(|e| ReleaseError::file(&target, e))?;
  }
  Ok(())
}

/// Regular files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> ReleaseResult<Vec<PathBuf>> {
  let mut files = Vec::new();
  for entry in fs::read_dir(dir).map_err(|e| ReleaseError::file(dir, e))? {
    let entry = entry.map_err(|e| ReleaseError::file(dir, e))?;
    if entry.file_type().map_err(|e| ReleaseError::file(entry.path(), e))?.is_file() {
      files.push(entry.path());
    }
  }
  files.sort();
  Ok(files)
}

/// Empty, `.`, `..`, or a filesystem root
fn is_unsafe_clean_path(path: &Path) -> bool {
  let cleaned = lexical_clean(path);
  if cleaned.as_os_str().is_empty() || cleaned == Path::new("..") {
    return true;
  }
  cleaned
    .components()
    .all(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
}
