//! Shutdown signalling
//!
//! A cancellation token shared between the accept loop and whoever
//! triggers shutdown (signal handler, tests).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable one-way cancellation flag
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
