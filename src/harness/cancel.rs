//! Cancellable inter-sample wait

use crate::error::{OctaneError, Result};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Handle used to interrupt a running harness from another thread
/// (typically a Ctrl-C handler).
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl CancelToken {
    /// Create a token that has not been cancelled
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake_tx,
            wake_rx,
        }
    }

    /// Cancel the run and wake any pending wait
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Full channel means a wake-up is already pending
        let _ = self.wake_tx.try_send(());
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`OctaneError::Cancelled`] if the token was cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(OctaneError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Block for `timeout`, returning early with [`OctaneError::Cancelled`]
    /// if the token is cancelled meanwhile.
    pub fn wait(&self, timeout: Duration) -> Result<()> {
        self.check()?;
        if timeout.is_zero() {
            return Ok(());
        }
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) => Err(OctaneError::Cancelled),
            Err(RecvTimeoutError::Timeout) => self.check(),
            // Unreachable while we hold a sender
            Err(RecvTimeoutError::Disconnected) => Err(OctaneError::Cancelled),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out() {
        let token = CancelToken::new();
        let start = Instant::now();
        token.wait(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_zero_wait_returns_immediately() {
        let token = CancelToken::new();
        token.wait(Duration::ZERO).unwrap();
    }

    #[test]
    fn test_cancel_wakes_waiter() {
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        let err = token.wait(Duration::from_secs(30)).unwrap_err();
        assert!(matches!(err, OctaneError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(30));
        handle.join().unwrap();
    }

    #[test]
    fn test_cancelled_token_stays_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.wait(Duration::from_millis(1)).is_err());
        assert!(token.wait(Duration::ZERO).is_err());
    }
}
