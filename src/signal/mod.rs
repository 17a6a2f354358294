//! Cancellation state shared by batch workers
//!
//! A batch stops taking new work when either:
//! 1. a worker fails (fail-fast: one bad file aborts the run), or
//! 2. the user interrupts (SIGINT/SIGTERM).
//!
//! On a second interrupt the process exits immediately.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Exit code after a second interrupt
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Cancellation flags
#[derive(Debug, Default)]
pub struct CancelState {
    /// Stop dequeuing work
    cancel_requested: AtomicBool,
    /// The stop came from a signal rather than a failed file
    interrupted: AtomicBool,
    signal_count: AtomicU8,
}

impl CancelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation after a failure.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Handle a signal (SIGINT/SIGTERM)
    ///
    /// Returns the appropriate action to take
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);

        if count == 0 {
            self.interrupted.store(true, Ordering::SeqCst);
            self.cancel_requested.store(true, Ordering::SeqCst);
            SignalAction::InitiateCancellation
        } else if count == 1 {
            SignalAction::ImmediateExit
        } else {
            SignalAction::Ignore
        }
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: stop handing out work, let in-flight files finish
    InitiateCancellation,
    /// Second signal: exit now
    ImmediateExit,
    /// Third+ signal: ignore
    Ignore,
}

/// Installs the process-wide interrupt handler
pub struct SignalHandler {
    state: Arc<CancelState>,
}

impl SignalHandler {
    pub fn new(state: Arc<CancelState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> Arc<CancelState> {
        Arc::clone(&self.state)
    }

    /// Install the signal handlers
    ///
    /// Must be called at most once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::InitiateCancellation => {
                tracing::warn!("interrupt received, finishing in-flight files");
            }
            SignalAction::ImmediateExit => {
                tracing::warn!("second interrupt received, exiting immediately");
                std::process::exit(EXIT_CODE_INTERRUPTED);
            }
            SignalAction::Ignore => {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = CancelState::new();
        assert!(!state.is_cancelled());
        assert!(!state.is_interrupted());
        assert_eq!(state.signal_count(), 0);
    }

    #[test]
    fn test_failure_cancel_is_not_an_interrupt() {
        let state = CancelState::new();
        state.cancel();
        assert!(state.is_cancelled());
        assert!(!state.is_interrupted());
    }

    #[test]
    fn test_signal_sequence() {
        let state = CancelState::new();

        assert_eq!(state.handle_signal(), SignalAction::InitiateCancellation);
        assert!(state.is_cancelled());
        assert!(state.is_interrupted());

        assert_eq!(state.handle_signal(), SignalAction::ImmediateExit);
        assert_eq!(state.handle_signal(), SignalAction::Ignore);
        assert_eq!(state.signal_count(), 3);
    }
}
