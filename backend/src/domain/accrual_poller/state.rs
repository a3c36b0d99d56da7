//! Single-flight phase and the shared rate-limit throttle.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Phase {
    Idle,
    Running,
}

/// Mutable poller state. One throttle applies to every order.
#[derive(Debug)]
pub(super) struct PollerState {
    phase: Phase,
    resume_at: Option<DateTime<Utc>>,
}

impl PollerState {
    pub(super) const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            resume_at: None,
        }
    }

    #[cfg(test)]
    pub(super) const fn phase(&self) -> Phase {
        self.phase
    }

    #[cfg(test)]
    pub(super) const fn resume_at(&self) -> Option<DateTime<Utc>> {
        self.resume_at
    }

    /// Time left before lookups may be issued again.
    pub(super) fn throttle_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let resume_at = self.resume_at?;
        (resume_at - now).to_std().ok().filter(|left| !left.is_zero())
    }

    /// Record a rate-limit response. A longer pending delay is never shortened.
    pub(super) fn record_rate_limit(&mut self, now: DateTime<Utc>, delay: Duration) {
        let delay = TimeDelta::from_std(delay).unwrap_or(TimeDelta::MAX);
        let candidate = now.checked_add_signed(delay).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.resume_at = Some(self.resume_at.map_or(candidate, |current| current.max(candidate)));
    }

    /// Drop the throttle once it has been waited out, unless a newer rate
    /// limit pushed it further.
    pub(super) fn release_throttle(&mut self, waited_until: DateTime<Utc>) {
        if self.resume_at.is_some_and(|resume_at| resume_at <= waited_until) {
            self.resume_at = None;
        }
    }

    pub(super) fn resume_target(&self) -> Option<DateTime<Utc>> {
        self.resume_at
    }
}

pub(super) fn lock(state: &Mutex<PollerState>) -> MutexGuard<'_, PollerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the `Running` phase for one pass and returns to `Idle` on drop.
pub(super) struct PassGuard<'a> {
    state: &'a Mutex<PollerState>,
}

impl<'a> PassGuard<'a> {
    /// Enter `Running`, or return `None` when a pass is already in flight.
    pub(super) fn begin(state: &'a Mutex<PollerState>) -> Option<Self> {
        let mut guard = lock(state);
        if guard.phase == Phase::Running {
            return None;
        }
        guard.phase = Phase::Running;
        Some(Self { state })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).phase = Phase::Idle;
    }
}
