//! Cooperative stop signal.
//!
//! Raised by whatever supervises the process (signal handler, service
//! wrapper) and observed by the orchestrator between cycles only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct StopState {
    raised: AtomicBool,
    notify: Notify,
}

/// Cloneable handle; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    state: Arc<StopState>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Idempotent.
    pub fn raise(&self) {
        self.state.raised.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has been raised.
    pub async fn raised(&self) {
        // Register before checking the flag so a concurrent `raise` is not lost.
        let notified = self.state.notify.notified();
        if self.is_raised() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clones_share_state() {
        let signal = StopSignal::new();
        let other = signal.clone();
        assert!(!other.is_raised());
        signal.raise();
        assert!(other.is_raised());
    }

    #[tokio::test]
    async fn raised_resolves_immediately_when_already_set() {
        let signal = StopSignal::new();
        signal.raise();
        tokio::time::timeout(Duration::from_millis(100), signal.raised())
            .await
            .expect("already raised signal must resolve");
    }

    #[tokio::test]
    async fn raised_wakes_waiter() {
        let signal = StopSignal::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.raised().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        signal.raise();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter must wake")
            .unwrap();
    }
}
