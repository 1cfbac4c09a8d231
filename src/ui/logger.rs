//! User-facing progress output
//!
//! Workflows report what they are doing through [`Logger`]. Nothing in the
//! release logic depends on what a logger does with the lines. Diagnostic
//! tracing (every git/gh invocation) goes through the `log` facade instead.

/// Step/detail/success/error sink for workflow progress
pub trait Logger {
  /// Start of a workflow step
  fn step(&self, message: &str);

  /// A labelled value belonging to the current step
  fn detail(&self, key: &str, value: &str);

  fn info(&self, message: &str);
  fn success(&self, message: &str);
  fn warn(&self, message: &str);
  fn error(&self, message: &str);
}

/// Emoji-prefixed lines on stdout, errors on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
  fn step(&self, message: &str) {
    println!();
    println!("🔷 {}", message);
  }

  fn detail(&self, key: &str, value: &str) {
    println!("   {}: {}", key, value);
  }

  fn info(&self, message: &str) {
    println!("   {}", message);
  }

  fn success(&self, message: &str) {
    println!("✅ {}", message);
  }

  fn warn(&self, message: &str) {
    println!("⚠️  {}", message);
  }

  fn error(&self, message: &str) {
    eprintln!("❌ {}", message);
  }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NopLogger;

impl Logger for NopLogger {
  fn step(&self, _message: &str) {}
  fn detail(&self, _key: &str, _value: &str) {}
  fn info(&self, _message: &str) {}
  fn success(&self, _message: &str) {}
  fn warn(&self, _message: &str) {}
  fn error(&self, _message: &str) {}
}
