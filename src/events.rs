//! The event channel the ledger publishes to after successful mutations.
//!
//! Subscribers (summary views, cache invalidation, future websockets) are
//! external collaborators: the ledger's correctness never depends on anyone
//! listening, so publishing to a channel with no receivers is not an error.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::{database_id::TransactionId, owner::OwnerId};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// What a ledger mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEventKind {
    /// A new transaction row was persisted.
    Created,
    /// An existing transaction row was changed.
    Updated,
    /// A transaction row was removed.
    Deleted,
}

/// A structured notification of one successful ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerEvent {
    /// The owner whose ledger and balance changed.
    pub owner_id: OwnerId,
    /// The kind of mutation.
    pub kind: LedgerEventKind,
    /// The transaction the mutation touched.
    pub transaction_id: TransactionId,
}

/// The publish side of the ledger event channel.
#[derive(Debug, Clone)]
pub struct LedgerEvents {
    sender: broadcast::Sender<LedgerEvent>,
}

impl LedgerEvents {
    /// Create a new event channel.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to mutation events.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    /// Publish `event`. Dropped silently when there are no subscribers.
    pub fn publish(&self, event: LedgerEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("no subscribers for ledger event {event:?}");
        }
    }
}

impl Default for LedgerEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::owner::OwnerId;

    use super::{LedgerEvent, LedgerEventKind, LedgerEvents};

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let events = LedgerEvents::new();

        events.publish(LedgerEvent {
            owner_id: OwnerId::new(1),
            kind: LedgerEventKind::Created,
            transaction_id: 1,
        });
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let events = LedgerEvents::new();
        let mut receiver = events.subscribe();
        let event = LedgerEvent {
            owner_id: OwnerId::new(7),
            kind: LedgerEventKind::Deleted,
            transaction_id: 33,
        };

        events.publish(event);

        assert_eq!(receiver.recv().await.unwrap(), event);
    }
}
