use crate::error::{OblioError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-call deadline and cancellation signal.
///
/// Clones share the cancellation flag, so a clone handed to another thread
/// can cancel the call. A call waiting on the token lock or on an HTTP
/// exchange notices cancellation within a few milliseconds and returns
/// without waiting for the exchange to finish.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// A context with no deadline that is never cancelled unless asked to
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let now = Instant::now();
        self.with_deadline(now.checked_add(timeout).unwrap_or(now))
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail if the call was cancelled or its deadline has passed
    pub(crate) fn check(&self) -> Result<()> {
        self.remaining().map(|_| ())
    }

    /// Time left before the deadline, `None` when there is no deadline
    pub(crate) fn remaining(&self) -> Result<Option<Duration>> {
        if self.is_cancelled() {
            return Err(OblioError::cancelled());
        }
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    Err(OblioError::timeout())
                } else {
                    Ok(Some(left))
                }
            }
        }
    }
}
