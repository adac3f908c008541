//! Close signal shared by the pumps of one session.

use std::sync::Arc;
use tokio::sync::watch;

/// One-shot signal that tears down every pump holding a clone.
///
/// Pumps own socket halves, so a torn-down pump drops its halves and the
/// sockets close once every pump of the session has stopped.
#[derive(Debug, Clone)]
pub struct Teardown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Teardown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Signal every holder to stop. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`Teardown::trigger`] has been called on any clone.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}
