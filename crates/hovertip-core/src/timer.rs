#![forbid(unsafe_code)]

//! Cancellable delayed tasks.
//!
//! The scheduler never touches a concrete timer API. It asks a
//! [`DelayScheduler`] for a [`TimerId`] and later receives that id back
//! through [`TooltipScheduler::on_timer`](crate::scheduler::TooltipScheduler::on_timer).
//!
//! [`DeterministicTimers`] is the host-driven implementation: the embedding
//! environment advances a monotonic clock explicitly and feeds the ids that
//! came due back into the scheduler. [`MonotonicClock`] supplies real elapsed
//! time for hosts that pump the timers from an event loop.

use core::time::Duration;

/// Handle for one scheduled delayed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Wrap a raw id (e.g. a browser `setTimeout` handle).
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A source of cancellable one-shot timers.
///
/// Implementations must not invoke the scheduler re-entrantly from
/// `schedule`; expiry is reported later, from the host's event loop.
pub trait DelayScheduler {
    /// Arrange for `delay` to elapse and return the handle that will be
    /// reported when it does.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a pending timer. Cancelling an unknown or fired id is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    id: TimerId,
    deadline: Duration,
}

/// Deterministic timers driven by an explicit monotonic clock.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTimers {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl DeterministicTimers {
    /// Create timers with the clock at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers that have neither fired nor been cancelled.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether `id` is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|s| s.id == id)
    }

    /// Absolute deadline of a pending timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.pending.iter().find(|s| s.id == id).map(|s| s.deadline)
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|s| s.deadline).min()
    }

    /// Advance the clock by `dt` and return the timers that came due.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerId> {
        let target = self.now.saturating_add(dt);
        self.advance_to(target)
    }

    /// Move the clock to `now` and return the timers that came due, ordered
    /// by deadline (ties by scheduling order).
    ///
    /// The clock never runs backwards; an earlier `now` fires nothing.
    pub fn advance_to(&mut self, now: Duration) -> Vec<TimerId> {
        if now > self.now {
            self.now = now;
        }
        let mut due: Vec<Scheduled> = Vec::new();
        let current = self.now;
        self.pending.retain(|s| {
            if s.deadline <= current {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.deadline, s.id));
        due.into_iter().map(|s| s.id).collect()
    }
}

impl DelayScheduler for DeterministicTimers {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id.max(1));
        self.next_id = id.0.wrapping_add(1);
        self.pending.push(Scheduled {
            id,
            deadline: self.now.saturating_add(delay),
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|s| s.id != id);
    }
}

/// Monotonic wall clock backed by `web_time::Instant`.
///
/// Works on native targets and in browsers (`performance.now()`), where
/// `std::time::Instant` is unavailable.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: web_time::Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }

    /// Time elapsed since [`start`](Self::start).
    #[must_use]
    pub fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}
