//! Cooperative cancellation for workflow runs
//!
//! Workflows check the token before every step. A step that already started
//! runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::error::{ReleaseError, ReleaseResult};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  cancelled: Arc<AtomicBool>,
}

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation; visible to every clone
  #[allow(dead_code)] // Called by embedding callers and tests
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Fail with [`ReleaseError::Cancelled`] if cancellation was requested
  pub fn check(&self) -> ReleaseResult<()> {
    if self.is_cancelled() {
      Err(ReleaseError::Cancelled)
    } else {
      Ok(())
    }
  }
}
