//! Auth change notification bus
//!
//! A process-wide publish/subscribe channel used to tell every interested
//! surface that the signed-in identity changed. The notification carries
//! no payload; it is purely a "re-read the session now" signal, which
//! keeps subscribers from rendering a mix of stale and fresh identity.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Payload-less invalidation channel for session changes.
///
/// Writers call `publish` exactly once after persisting the new session
/// state; subscribers react by re-reading the session from its store.
#[derive(Clone)]
pub struct AuthEventBus {
    tx: broadcast::Sender<()>,
}

impl AuthEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify all current subscribers. Having no subscribers is not an
    /// error; the signal is simply dropped.
    pub fn publish(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for AuthEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn every_subscriber_sees_each_publish_once() {
        let bus = AuthEventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish();

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
        assert!(matches!(first.try_recv(), Err(TryRecvError::Empty)));
        assert!(matches!(second.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_not_an_error() {
        let bus = AuthEventBus::new();
        bus.publish();

        // A subscriber joining afterwards starts clean
        let mut late = bus.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }
}
