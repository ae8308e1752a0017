//! Run cancellation: a shared token checked between fetch dispatches.
//!
//! When set (e.g. by a Ctrl-C handler), the orchestrator stops scheduling new
//! fetches, lets in-flight ones finish, and skips the deletion and manifest
//! commit steps so no partial state is persisted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag shared between the signal handler and the
/// sync orchestrator.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, more than once.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
