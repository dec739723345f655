//! "Server started" notification.

use tokio::sync::watch;

/// One-shot signal raised once the server is listening.
///
/// Backed by a watch channel: a subscriber created after the signal fired
/// still observes it.
pub struct ServerStarted {
    tx: watch::Sender<bool>,
}

impl ServerStarted {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Raise the signal. Repeated calls are no-ops.
    pub fn notify(&self) {
        self.tx.send_if_modified(|started| {
            let changed = !*started;
            *started = true;
            changed
        });
    }

    pub fn has_started(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ServerStarted {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_late_subscriber_sees_signal() {
        let signal = ServerStarted::new();
        assert!(!signal.has_started());
        signal.notify();
        signal.notify();

        let mut rx = signal.subscribe();
        assert!(rx.wait_for(|started| *started).await.is_ok());
        assert!(signal.has_started());
    }
}
