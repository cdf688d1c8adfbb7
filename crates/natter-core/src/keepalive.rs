//! Keepalive timer state.
//!
//! Some talkers drop connections that stay idle for a few minutes. When
//! enabled at connect time, the runtime wakes every [`DEFAULT_KEEPALIVE_INTERVAL`]
//! and asks [`KeepAlive::tick`] whether to send an empty line.
//!
//! ```text
//! ┌──────┐  arm(now)   ┌───────┐
//! │ Idle │────────────>│ Armed │──┐ tick(now): due? reset baseline, send
//! └──────┘<────────────└───────┘<─┘
//!           disarm()
//! ```
//!
//! The timer keeps its own baseline. Outbound chat does not move it.

use std::{
    ops::Sub,
    time::{Duration, Instant},
};

/// Period between timer wakeups, and the idle threshold.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(120);

/// Timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveState {
    /// Not scheduled
    Idle,
    /// Scheduled, waking every interval
    Armed,
}

/// Keepalive state machine.
///
/// Pure: no I/O, time passed in. Generic over `Instant` like the rest of the
/// session layer.
#[derive(Debug, Clone)]
pub struct KeepAlive<I = Instant>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    state: KeepAliveState,
    interval: Duration,
    last_reset: Option<I>,
}

impl<I> KeepAlive<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle timer with the given threshold.
    pub fn new(interval: Duration) -> Self {
        Self { state: KeepAliveState::Idle, interval, last_reset: None }
    }

    /// Current state.
    pub fn state(&self) -> KeepAliveState {
        self.state
    }

    /// Whether the runtime should keep the timer scheduled.
    pub fn is_armed(&self) -> bool {
        self.state == KeepAliveState::Armed
    }

    /// Wakeup period and idle threshold.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Baseline the next tick measures from.
    pub fn last_reset(&self) -> Option<I> {
        self.last_reset
    }

    /// Record `now` as the baseline without changing state.
    pub fn reset(&mut self, now: I) {
        self.last_reset = Some(now);
    }

    /// Schedule the timer with `now` as baseline.
    pub fn arm(&mut self, now: I) {
        self.state = KeepAliveState::Armed;
        self.last_reset = Some(now);
    }

    /// Stop the timer.
    pub fn disarm(&mut self) {
        self.state = KeepAliveState::Idle;
    }

    /// Process a timer wakeup.
    ///
    /// Returns `true` when a keepalive line is due: the timer is armed, the
    /// connection is up, and strictly more than the interval has passed since
    /// the baseline. The baseline moves to `now` in that case only.
    pub fn tick(&mut self, now: I, connected: bool) -> bool {
        if !connected || self.state != KeepAliveState::Armed {
            return false;
        }

        let due = match self.last_reset {
            None => true,
            Some(last) => now - last > self.interval,
        };

        if due {
            self.last_reset = Some(now);
        }

        due
    }
}

impl<I> Default for KeepAlive<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    fn default() -> Self {
        Self::new(DEFAULT_KEEPALIVE_INTERVAL)
    }
}
