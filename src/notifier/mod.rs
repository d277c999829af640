//! Change notifier
//!
//! Keeps the set of connected listeners and sends each of them a short text
//! line whenever the catalog is read or changed. Delivery is best-effort:
//! closed listeners are skipped, nothing is replayed, and a listener that
//! falls behind loses events instead of slowing anyone else down.

mod events;
mod subscriber;

pub use events::ChangeEvent;
pub use subscriber::{ChannelSubscriber, NotifyError, Subscriber};

use crate::config::NotifierConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Buffer size for channel subscribers when none is configured
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Handle identifying a subscription
pub type SubscriberId = u64;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the event
    pub delivered: usize,
    /// Subscribers whose transport was already closed
    pub skipped: usize,
    /// Subscribers that were open but refused the event
    pub dropped: usize,
}

#[derive(Default)]
struct Registry {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, Arc<dyn Subscriber>>,
}

/// Fan-out of change events to connected subscribers
///
/// Cloning yields another handle to the same subscriber set.
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
    channel_capacity: usize,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            registry: Arc::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        Self {
            channel_capacity: config.channel_capacity.max(1),
            ..Self::default()
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a subscriber; it receives every broadcast from now on
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.insert(id, subscriber);
        tracing::debug!("Subscriber {} connected ({} total)", id, registry.subscribers.len());
        id
    }

    /// Subscribes a channel with the configured buffer size
    ///
    /// Events arrive on the returned receiver; dropping it closes the
    /// subscription, which is then skipped until unsubscribed.
    pub fn open_channel(&self) -> (SubscriberId, mpsc::Receiver<String>) {
        let (subscriber, receiver) = ChannelSubscriber::open(self.channel_capacity);
        (self.subscribe(Arc::new(subscriber)), receiver)
    }

    /// Removes a subscriber
    ///
    /// Returns `false` if it was already gone; removing twice is not an error.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.registry().subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!("Subscriber {} disconnected", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Sends `text` to every subscriber whose transport is still open
    ///
    /// Subscribers are sent to one after another, outside the registry lock.
    /// Subscribers found closed are removed afterwards.
    pub fn broadcast(&self, text: &str) -> BroadcastReport {
        let targets: Vec<(SubscriberId, Arc<dyn Subscriber>)> = self
            .registry()
            .subscribers
            .iter()
            .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
            .collect();

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();
        for (id, subscriber) in targets {
            if !subscriber.is_open() {
                report.skipped += 1;
                closed.push(id);
                continue;
            }
            match subscriber.send_text(text) {
                Ok(()) => report.delivered += 1,
                Err(NotifyError::Closed) => {
                    report.skipped += 1;
                    closed.push(id);
                }
                Err(e) => {
                    tracing::debug!("Dropped event for subscriber {}: {}", id, e);
                    report.dropped += 1;
                }
            }
        }

        if !closed.is_empty() {
            let mut registry = self.registry();
            for id in &closed {
                registry.subscribers.remove(id);
            }
            tracing::debug!("Removed {} closed subscribers", closed.len());
        }
        report
    }

    /// Broadcasts the display form of a change event
    pub fn publish(&self, event: &ChangeEvent) -> BroadcastReport {
        self.broadcast(&event.to_string())
    }
}
