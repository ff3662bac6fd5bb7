//! Refresh timing: grid-aligned success delays, flat failure retries and
//! the single armed refresh handle.
//!
//! After a successful fetch the next refresh lands on the next multiple of
//! the success interval counted from the Unix epoch, plus a random offset
//! below the jitter window. Many independent clients therefore refresh on
//! the same clock grid, and the jitter spreads those sharing a boundary.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::time::Instant;

/// Why a refresh was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleReason {
    /// First refresh after startup.
    Startup,
    /// Regular refresh after a successful fetch.
    Success,
    /// Retry after a failed fetch.
    Failure,
}

/// The one pending refresh.
///
/// The service keeps at most one of these. Arming a new refresh replaces
/// the previous handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRefresh {
    deadline: Instant,
    delay: Duration,
    reason: ScheduleReason,
}

impl ScheduledRefresh {
    /// Arm a refresh `delay` from now.
    pub fn after(delay: Duration, reason: ScheduleReason) -> Self {
        let now = Instant::now();
        Self {
            deadline: now.checked_add(delay).unwrap_or(now),
            delay,
            reason,
        }
    }

    /// When the refresh fires.
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// The delay the refresh was armed with.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Why the refresh was armed.
    pub const fn reason(&self) -> ScheduleReason {
        self.reason
    }
}

/// Milliseconds since the Unix epoch, clamped at zero.
pub fn now_epoch_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Delay from `now_ms` to the next grid boundary plus `jitter`.
///
/// The boundary is `ceil(now_ms / interval) * interval`, so a `now_ms`
/// that sits exactly on the grid yields just the jitter.
pub fn next_success_delay(now_ms: u64, interval: Duration, jitter: Duration) -> Duration {
    let interval_ms = duration_ms(interval).max(1);
    let boundary = now_ms.div_ceil(interval_ms).saturating_mul(interval_ms);
    let until_boundary = boundary.saturating_sub(now_ms);
    Duration::from_millis(until_boundary.saturating_add(duration_ms(jitter)))
}

/// Draw a uniform jitter in `[0, window)` at millisecond resolution.
///
/// A window shorter than one millisecond yields no jitter.
pub fn sample_jitter(window: Duration) -> Duration {
    let window_ms = duration_ms(window);
    if window_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..window_ms))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
