//! The refresh service: scheduling, idle deferral and the driver loop.
//!
//! [`RefreshService`] issues fetches through an [`ArtifactSource`], hands
//! successful payloads to the store and arms the next refresh:
//!
//! - **Success**: the next grid boundary plus jitter
//!   (see [`next_success_delay`]). A payload the store rejects still
//!   counts as a successful fetch.
//! - **Failure**: a flat retry, no growth.
//! - **Idle host**: no fetch at all. A single pending flag is set and the
//!   next resume issues exactly one request.
//!
//! At most one refresh is armed and at most one fetch is in flight; the
//! loop awaits each fetch before doing anything else.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::ScheduleConfig;
use crate::context::ArtifactContext;
use crate::decode::ResponseError;
use crate::schedule::{
    ScheduleReason, ScheduledRefresh, next_success_delay, now_epoch_ms, sample_jitter,
};
use crate::source::{ArtifactSource, FetchError};
use crate::store::RefreshStats;

/// What a call to [`RefreshService::request_data`] did.
#[derive(Debug)]
pub enum RequestOutcome {
    /// The host was idle; nothing was fetched and the request is pending.
    DeferredIdle,
    /// A payload was fetched and applied.
    Refreshed(RefreshStats),
    /// A payload was fetched but rejected; the store kept its data.
    Rejected(ResponseError),
    /// The fetch itself failed.
    FetchFailed(FetchError),
}

/// Drives periodic refreshes of one [`ArtifactContext`].
#[derive(Debug)]
pub struct RefreshService<S> {
    ctx: ArtifactContext,
    source: S,
    schedule: ScheduleConfig,
    pending_on_idle: bool,
    next: Option<ScheduledRefresh>,
    fetches: u64,
}

impl<S: ArtifactSource> RefreshService<S> {
    /// Create a service. Nothing is armed until [`arm_startup`] or
    /// [`run`] is called.
    ///
    /// [`arm_startup`]: Self::arm_startup
    /// [`run`]: Self::run
    pub const fn new(ctx: ArtifactContext, source: S, schedule: ScheduleConfig) -> Self {
        Self {
            ctx,
            source,
            schedule,
            pending_on_idle: false,
            next: None,
            fetches: 0,
        }
    }

    /// Arm the first refresh after the configured startup delay.
    pub fn arm_startup(&mut self) {
        self.arm(self.schedule.startup_delay(), ScheduleReason::Startup);
    }

    /// Request fresh data.
    ///
    /// While the host is idle this only records a pending request. Otherwise
    /// exactly one fetch is issued and the next refresh is armed according
    /// to its outcome.
    pub async fn request_data(&mut self) -> RequestOutcome {
        self.next = None;

        if self.ctx.idle().is_idle() {
            if !self.pending_on_idle {
                info!("host idle, deferring artifact refresh until resume");
            }
            self.pending_on_idle = true;
            return RequestOutcome::DeferredIdle;
        }

        self.fetches = self.fetches.saturating_add(1);
        debug!(fetch = self.fetches, "requesting artifact data");

        match self.source.fetch().await {
            Ok(payload) => {
                let outcome = match self.ctx.apply_refresh(&payload).await {
                    Ok(stats) => RequestOutcome::Refreshed(stats),
                    Err(e) => RequestOutcome::Rejected(e),
                };
                let jitter = sample_jitter(self.schedule.jitter_window());
                let delay =
                    next_success_delay(now_epoch_ms(), self.schedule.success_interval(), jitter);
                self.arm(delay, ScheduleReason::Success);
                outcome
            }
            Err(e) => {
                warn!(error = %e, "artifact fetch failed");
                self.arm(self.schedule.failure_retry(), ScheduleReason::Failure);
                RequestOutcome::FetchFailed(e)
            }
        }
    }

    /// Handle a resume-from-idle signal.
    ///
    /// Issues one request if one was deferred while idle, otherwise does
    /// nothing and returns `None`.
    pub async fn on_idle_resume(&mut self) -> Option<RequestOutcome> {
        if !self.pending_on_idle {
            return None;
        }
        self.pending_on_idle = false;
        info!("host resumed, issuing deferred artifact refresh");
        Some(self.request_data().await)
    }

    /// Whether a request is waiting for the host to resume.
    pub const fn is_pending_on_idle(&self) -> bool {
        self.pending_on_idle
    }

    /// The armed refresh, if any.
    pub const fn next_refresh(&self) -> Option<&ScheduledRefresh> {
        self.next.as_ref()
    }

    /// Number of fetches issued so far.
    pub const fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// The context this service refreshes.
    pub const fn context(&self) -> &ArtifactContext {
        &self.ctx
    }

    /// Run until `shutdown` becomes `true` or its sender is dropped.
    ///
    /// Arms the startup refresh if nothing is armed yet, then waits on the
    /// armed deadline, the idle resume signal and the shutdown signal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if self.next.is_none() && !self.pending_on_idle {
            self.arm_startup();
        }
        let idle = Arc::clone(self.ctx.idle());

        info!("artifact refresh loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let deadline = self.next.as_ref().map(ScheduledRefresh::deadline);

            tokio::select! {
                () = sleep_until_armed(deadline) => {
                    self.request_data().await;
                }
                () = idle.resumed() => {
                    self.on_idle_resume().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!(fetches = self.fetches, "artifact refresh loop stopped");
    }

    fn arm(&mut self, delay: std::time::Duration, reason: ScheduleReason) {
        let armed = ScheduledRefresh::after(delay, reason);
        debug!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            reason = ?reason,
            "next artifact refresh armed"
        );
        self.next = Some(armed);
    }
}

/// Sleep until `deadline`, or forever when nothing is armed.
async fn sleep_until_armed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
