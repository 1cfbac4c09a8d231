//! Operator-facing output and confirmation prompts

pub mod logger;
pub mod prompt;

pub use logger::{ConsoleLogger, Logger, NopLogger};
pub use prompt::{ConsolePrompter, Prompter};
