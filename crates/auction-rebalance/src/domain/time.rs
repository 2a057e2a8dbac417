//! Transaction time.
//!
//! The engine is invoked the way a transaction is: the caller supplies the
//! current unix timestamp with every call. Curve bucketing is integer
//! arithmetic over elapsed seconds, so both types are plain second counts.

use std::ops::Add;

/// A unix timestamp, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

/// A span of time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Self = Self(0);

    pub fn seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn hours(hours: u64) -> Self {
        Self(hours.saturating_mul(3600))
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl Timestamp {
    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.0))
    }
}

/// The half-open interval `[start, start + duration)` during which bids may
/// settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceWindow {
    start: Timestamp,
    duration: Duration,
}

impl RebalanceWindow {
    pub fn new(start: Timestamp, duration: Duration) -> Self {
        Self { start, duration }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn contains(&self, now: Timestamp) -> bool {
        now >= self.start && now < self.start + self.duration
    }

    pub fn elapsed(&self, now: Timestamp) -> Duration {
        now.saturating_duration_since(self.start)
    }
}
