//! Coordinated shutdown flags shared between the application and the server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Two-phase shutdown state.
///
/// Clones share the same flags. The accept loop and the game clock stop
/// once shutdown is initiated; the application marks completion after its
/// drain phase.
#[derive(Debug, Clone)]
pub struct ShutdownState {
    /// Set once no new connections or ticks should be processed
    shutdown_initiated: Arc<AtomicBool>,
    /// Set once draining is finished and final cleanup can begin
    shutdown_complete: Arc<AtomicBool>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            shutdown_complete: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::Acquire)
    }

    pub fn is_shutdown_complete(&self) -> bool {
        self.shutdown_complete.load(Ordering::Acquire)
    }

    pub fn initiate_shutdown(&self) {
        self.shutdown_initiated.store(true, Ordering::Release);
        info!("🛑 Shutdown initiated - no new connections will be accepted");
    }

    pub fn complete_shutdown(&self) {
        self.shutdown_complete.store(true, Ordering::Release);
        info!("✅ Connections drained - ready for final cleanup");
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_flags() {
        let state = ShutdownState::new();
        let observer = state.clone();
        assert!(!observer.is_shutdown_initiated());

        state.initiate_shutdown();
        assert!(observer.is_shutdown_initiated());
        assert!(!observer.is_shutdown_complete());

        state.complete_shutdown();
        assert!(observer.is_shutdown_complete());
    }
}
