//! Publish/subscribe channel for completion events
//!
//! Composition-based: the store owns an `EventBus` instead of inheriting
//! from an emitter type. Each subscriber gets its own unbounded channel;
//! publishing walks the subscriber list and drops senders whose receiver
//! side has gone away.

use futures::stream;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use keyfig_core::{EventStream, StoreEvent};

#[derive(Debug, Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StoreEvent>>>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .push(tx);

        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }

    pub(crate) fn publish(&self, event: StoreEvent) {
        debug!(event = %event.name(), success = event.is_success(), "Publishing store event");
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_every_subscriber_sees_the_event() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(StoreEvent::Set {
            key: "foo".to_string(),
            error: None,
        });

        assert_eq!(first.next().await.unwrap().name(), "set:foo");
        assert_eq!(second.next().await.unwrap().name(), "set:foo");
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        drop(first);

        bus.publish(StoreEvent::MultiSet {
            applied: Default::default(),
            error: None,
        });

        assert!(bus.subscribers.lock().unwrap().is_empty());
    }
}
