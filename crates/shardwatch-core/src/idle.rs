//! Host idle state shared between the refresh service and whatever
//! detects user activity.
//!
//! The service never polls for idleness on its own. It asks
//! [`IdleState::is_idle`] when a refresh is due and waits on
//! [`IdleState::resumed`] for the resume signal.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tracing::debug;

/// Shared idle flag with a resume notification.
#[derive(Debug, Default)]
pub struct IdleState {
    idle: AtomicBool,
    resume_notify: Notify,
}

impl IdleState {
    /// Create a non-idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the host is idle right now.
    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }

    /// Mark the host idle. Refreshes falling due from now on are deferred.
    pub fn set_idle(&self) {
        if !self.idle.swap(true, Ordering::AcqRel) {
            debug!("host went idle");
        }
    }

    /// Mark the host active again and wake the waiting service.
    pub fn resume(&self) {
        self.idle.store(false, Ordering::Release);
        self.resume_notify.notify_one();
        debug!("host resumed from idle");
    }

    /// Wait for the next [`resume`](Self::resume) call.
    ///
    /// A resume that happened while nobody was waiting is remembered and
    /// completes the next wait immediately.
    pub async fn resumed(&self) {
        self.resume_notify.notified().await;
    }
}
