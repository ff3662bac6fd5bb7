//! The per-process artifact context.
//!
//! [`ArtifactContext`] owns the store, the change hooks and the idle
//! state. It is constructed once and cloned (cheaply, everything is behind
//! an [`Arc`]) into the refresh service and every reader. Separate
//! contexts are fully isolated from each other.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use crate::config::ShardwatchConfig;
use crate::decode::ResponseError;
use crate::hooks::{ChangeHooks, HookEvent};
use crate::idle::IdleState;
use crate::store::{ArtifactStore, Generation, RefreshStats};

/// Shared handle to the artifact model and its collaborators.
#[derive(Debug, Clone)]
pub struct ArtifactContext {
    store: Arc<RwLock<ArtifactStore>>,
    hooks: ChangeHooks,
    idle: Arc<IdleState>,
}

impl ArtifactContext {
    /// Create a context with an empty store.
    pub fn new(hook_capacity: usize) -> Self {
        let hooks = ChangeHooks::new(hook_capacity);
        Self {
            store: Arc::new(RwLock::new(ArtifactStore::new(hooks.clone()))),
            hooks,
            idle: Arc::new(IdleState::new()),
        }
    }

    /// Create a context sized from configuration.
    pub fn from_config(config: &ShardwatchConfig) -> Self {
        Self::new(config.hooks.channel_capacity)
    }

    /// The current generation. Cheap: clones an [`Arc`].
    pub async fn snapshot(&self) -> Arc<Generation> {
        self.store.read().await.current()
    }

    /// Apply a fetched payload to the store.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] if the payload was rejected; the store is
    /// unchanged in that case.
    pub async fn apply_refresh(&self, payload: &Value) -> Result<RefreshStats, ResponseError> {
        self.store.write().await.apply_refresh(payload)
    }

    /// Discard the current generation.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<HookEvent> {
        self.hooks.subscribe()
    }

    /// The change hooks.
    pub const fn hooks(&self) -> &ChangeHooks {
        &self.hooks
    }

    /// The shared idle state.
    pub const fn idle(&self) -> &Arc<IdleState> {
        &self.idle
    }
}
