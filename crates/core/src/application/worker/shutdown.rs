// Worker Shutdown Token

use tokio::sync::watch;

/// Shutdown signal for graceful termination
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for shutdown signal (returns at once if already requested)
    pub async fn wait(&mut self) {
        let closed = self.rx.wait_for(|stop| *stop).await.is_err();
        if closed {
            // Sender dropped without signalling: nobody can stop us anymore.
            std::future::pending::<()>().await;
        }
    }
}

/// Shutdown sender
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Signal shutdown to all workers and background loops
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Create a shutdown channel
pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}
