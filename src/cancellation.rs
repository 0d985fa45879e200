//! Cooperative cancellation token (spec.md section 4.3 "Cancellation").
//!
//! Grounded on the `shutdown_flag: Arc<AtomicBool>` the teacher's worker pool
//! already uses internally (`walk/finder.rs`); this just gives it a public,
//! clonable, checkpoint-friendly API so a caller can hand one in via
//! `Options`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-clonable cooperative cancellation signal.
///
/// Checked at two points per spec.md section 4.3: before popping a work item,
/// and between children while iterating one directory. Cancelling never
/// interrupts an in-flight OS call; it only stops new work from starting.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[must_use]
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
