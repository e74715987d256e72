// Completion Signal
//
// Level-triggered, set-once, broadcast: built on a watch channel so late
// waiters see the stored value without blocking.

use tokio::sync::watch;

#[derive(Debug)]
pub struct CompletionSignal {
    tx: watch::Sender<bool>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Set the signal. Setting it again is a no-op for waiters.
    pub fn set(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is set (returns immediately if it already is)
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|set| *set).await;
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_starts_unset() {
        let signal = CompletionSignal::new();
        assert!(!signal.is_set());

        let mut wait = task::spawn(signal.wait());
        assert_pending!(wait.poll());
    }

    #[test]
    fn test_set_wakes_pending_waiter() {
        let signal = CompletionSignal::new();
        let mut wait = task::spawn(signal.wait());
        assert_pending!(wait.poll());

        signal.set();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
    }

    #[test]
    fn test_late_waiter_returns_immediately() {
        let signal = CompletionSignal::new();
        signal.set();
        signal.set();

        let mut wait = task::spawn(signal.wait());
        assert_ready!(wait.poll());
        assert!(signal.is_set());
    }

    #[tokio::test]
    async fn test_broadcast_to_many_waiters() {
        let signal = Arc::new(CompletionSignal::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let signal = Arc::clone(&signal);
            handles.push(tokio::spawn(async move { signal.wait().await }));
        }

        tokio::task::yield_now().await;
        signal.set();

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
