//! Change notification for refresh generations.
//!
//! After every successful refresh the store publishes one
//! [`HookEvent::ArtifactsUpdated`] carrying the old and new entity lists.
//! Subscribers receive events through a [`tokio::sync::broadcast`] channel;
//! a subscriber that falls behind by more than the channel capacity skips
//! to the newest event.

use std::sync::Arc;

use serde::Serialize;
use shardwatch_types::ArtifactsUpdated;
use tokio::sync::broadcast;
use tracing::trace;

/// Events published by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum HookEvent {
    /// A refresh replaced the current generation.
    #[serde(rename = "artifactsUpdated")]
    ArtifactsUpdated(Arc<ArtifactsUpdated>),
}

impl HookEvent {
    /// Published event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ArtifactsUpdated(_) => "artifactsUpdated",
        }
    }
}

/// Publisher side of the change-notification channel.
#[derive(Debug, Clone)]
pub struct ChangeHooks {
    tx: broadcast::Sender<HookEvent>,
}

impl ChangeHooks {
    /// Create a hook channel buffering `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<HookEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers reached. Zero subscribers is not
    /// an error.
    pub fn publish(&self, event: HookEvent) -> usize {
        let name = event.name();
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(event = name, delivered, "hook event published");
        delivered
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
