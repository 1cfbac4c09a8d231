//! The fixed category vocabulary
//!
//! Declaration order is display order. Parsing, validation and rendering all
//! read the order from this enum.

use std::fmt;

/// A changelog category header (`### Added`, `### Fixed`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
  Added,
  Changed,
  Fixed,
  Removed,
  Security,
  Deprecated,
}

impl Category {
  /// Every category, in display order
  pub const ALL: [Category; 6] = [
    Category::Added,
    Category::Changed,
    Category::Fixed,
    Category::Removed,
    Category::Security,
    Category::Deprecated,
  ];

  /// Exact, case-sensitive header name lookup
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|c| c.name() == name)
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Added => "Added",
      Self::Changed => "Changed",
      Self::Fixed => "Fixed",
      Self::Removed => "Removed",
      Self::Security => "Security",
      Self::Deprecated => "Deprecated",
    }
  }

  /// "Added, Changed, Fixed, ..." for error messages
  pub fn vocabulary() -> String {
    Self::ALL.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// Running check that category headers in one section follow vocabulary order
///
/// Repeating the same category is allowed; going backwards is not.
#[derive(Debug, Default)]
pub(crate) struct OrderTracker {
  last: Option<Category>,
}

impl OrderTracker {
  /// Start a new section
  pub(crate) fn reset(&mut self) {
    self.last = None;
  }

  /// Record `next`, returning the previous category if `next` comes before it
  pub(crate) fn advance(&mut self, next: Category) -> Result<(), Category> {
    if let Some(last) = self.last
      && next < last
    {
      return Err(last);
    }
    self.last = Some(next);
    Ok(())
  }
}
