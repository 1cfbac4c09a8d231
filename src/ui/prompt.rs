//! Confirmation gates before mutating steps

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::io::{self, BufRead, Write};

/// Asks the operator before a mutating action
pub trait Prompter {
  /// `Ok(false)` means the operator declined
  fn confirm(&self, action: &str, details: &[String]) -> ReleaseResult<bool>;
}

/// Prompts on stdin/stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
  fn confirm(&self, action: &str, details: &[String]) -> ReleaseResult<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_with(&mut stdin.lock(), &mut stdout.lock(), action, details)
  }
}

/// Print the action and its details, accept only `y`/`Y`
pub fn confirm_with<R: BufRead, W: Write>(
  input: &mut R,
  out: &mut W,
  action: &str,
  details: &[String],
) -> ReleaseResult<bool> {
  writeln!(out, "\nConfirm: {}", action).context("write prompt")?;
  for detail in details.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
    writeln!(out, "  {}", detail).context("write prompt")?;
  }
  write!(out, "Proceed? [y/N]: ").context("write prompt")?;
  out.flush().context("write prompt")?;

  let mut line = String::new();
  input.read_line(&mut line).context("read prompt response")?;
  Ok(line.trim().eq_ignore_ascii_case("y"))
}

/// Consult `prompter` if there is one; a decline becomes [`ReleaseError::Declined`]
pub fn require_confirmation(prompter: Option<&dyn Prompter>, action: &str, details: &[String]) -> ReleaseResult<()> {
  let Some(prompter) = prompter else {
    return Ok(());
  };
  if prompter.confirm(action, details)? {
    Ok(())
  } else {
    Err(ReleaseError::Declined {
      action: action.to_string(),
    })
  }
}

/// Confirm before acting from a branch other than trunk
pub fn confirm_off_trunk(
  prompter: Option<&dyn Prompter>,
  current: &str,
  trunk: &str,
  operation: &str,
  details: &[String],
) -> ReleaseResult<()> {
  if current.is_empty() || current == trunk {
    return Ok(());
  }
  let mut all = vec![format!("Current branch: {}", current)];
  all.extend(details.iter().cloned());
  require_confirmation(prompter, &format!("run {} from non-{} branch", operation, trunk), &all)
}

/// Prompts only make sense for a live, interactive, mutating run
pub fn should_prompt(dry_run: bool, assume_yes: bool, interactive: bool) -> bool {
  !dry_run && !assume_yes && interactive
}


#[cfg(test)]
mod tests {
  use super::testing::ScriptedPrompter;
  use super::*;
  use crate::core::error::ErrorKind;

  #[test]
  fn test_only_y_accepts() {
    for (answer, expected) in [("y\n", true), ("Y\n", true), ("yes\n", false), ("\n", false), ("", false)] {
      let mut out = Vec::new();
      let ok = confirm_with(&mut answer.as_bytes(), &mut out, "push prep branch", &[]).unwrap();
      assert_eq!(ok, expected, "answer {:?}", answer);
    }
  }

  #[test]
  fn test_prompt_text_skips_blank_details() {
    let mut out = Vec::new();
    let details = vec!["Branch: release-prep/studioctl-v1.0.0".to_string(), "  ".to_string()];
    confirm_with(&mut "n\n".as_bytes(), &mut out, "push prep branch", &details).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
      text,
      "\nConfirm: push prep branch\n  Branch: release-prep/studioctl-v1.0.0\nProceed? [y/N]: "
    );
  }

  #[test]
  fn test_decline_is_declined_error() {
    let prompter = ScriptedPrompter::new(&[false]);
    let err = require_confirmation(Some(&prompter), "create GitHub PR", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Declined);
    assert!(require_confirmation(None, "create GitHub PR", &[]).is_ok());
  }

  #[test]
  fn test_off_trunk_only_asks_off_trunk() {
    let prompter = ScriptedPrompter::new(&[]);
    confirm_off_trunk(Some(&prompter), "main", "main", "prepare", &[]).unwrap();
    assert!(prompter.asked.borrow().is_empty());

    confirm_off_trunk(Some(&prompter), "feature/x", "main", "prepare", &[]).unwrap();
    assert_eq!(prompter.asked.borrow().as_slice(), ["run prepare from non-main branch"]);
  }

  #[test]
  fn test_should_prompt() {
    assert!(should_prompt(false, false, true));
    assert!(!should_prompt(true, false, true));
    assert!(!should_prompt(false, true, true));
    assert!(!should_prompt(false, false, false));
  }
}
