use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Raised when the outer request cancels an analysis pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("the analysis pass was cancelled")]
pub struct Cancelled;

/// A cheaply clonable cancellation flag.
///
/// The owner of a request holds one clone and cancels it when the client
/// abandons the request; the analyzer checks its clone between visited
/// nodes. Cancellation is sticky.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
