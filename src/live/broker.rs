use tokio::sync::broadcast;

use super::query::Collection;

/// A committed write somewhere in the store. Carries just enough for
/// subscribers to decide whether their snapshot is stale.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub user_id: String,
}

/// Fan-out bus for change events. The mutation gateway publishes after
/// every committed write; each live subscription holds a receiver.
#[derive(Debug, Clone)]
pub struct ChangeBroker {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBroker {
    pub fn new() -> Self {
        // Slow receivers that fall behind this buffer resync from the
        // store instead of replaying events, so the capacity only needs
        // to absorb short bursts.
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.tx.receiver_count();
        tracing::trace!(
            collection = event.collection.as_str(),
            user_id = %event.user_id,
            receivers,
            "Publishing change event"
        );
        // Send only fails when nobody is listening, which is fine.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeBroker {
    fn default() -> Self {
        Self::new()
    }
}
