//! Request-scoped cancellation and deadline, checked at stage boundaries.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ess_core::errors::{EssError, EssResult};

/// The four pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Classify,
    StructuredQuery,
    DocumentLookup,
    Fuse,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::Classify,
        Stage::StructuredQuery,
        Stage::DocumentLookup,
        Stage::Fuse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classify => "classify",
            Self::StructuredQuery => "structured_query",
            Self::DocumentLookup => "document_lookup",
            Self::Fuse => "fuse",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deadline plus a cancel flag shared with whoever may cancel the request.
/// Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct RequestControl {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl RequestControl {
    /// No deadline, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::default(),
        }
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

    /// Fail if the request was cancelled or its deadline passed before
    /// `stage` starts.
    pub fn check(&self, stage: Stage) -> EssResult<()> {
        if self.is_cancelled() {
            return Err(EssError::Cancelled {
                stage: stage.as_str().to_string(),
            });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(EssError::DeadlineExceeded {
                stage: stage.as_str().to_string(),
            });
        }
        Ok(())
    }
}
