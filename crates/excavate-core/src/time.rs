//! Time primitives for the countdown estimator
//!
//! Samples are stamped with wall-clock time in milliseconds, matching the
//! resolution the remote slot counter is reasoned about in.

use std::ops::Add;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock time - milliseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct WallTime(pub i64);

impl WallTime {
    pub const ZERO: WallTime = WallTime(0);

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        WallTime(millis)
    }

    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        WallTime(secs * 1000)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Read the operating system wall clock
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => WallTime(since.as_millis() as i64),
            // Clock set before 1970
            Err(e) => WallTime(-(e.duration().as_millis() as i64)),
        }
    }

    /// Signed milliseconds from `earlier` to `self`.
    /// Negative when `earlier` is actually later.
    #[inline]
    pub fn millis_since(self, earlier: WallTime) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        WallTime(self.0.saturating_add(millis))
    }
}

impl Add<Duration> for WallTime {
    type Output = WallTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl std::fmt::Debug for WallTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wall({}ms)", self.0)
    }
}

/// Source of wall-clock readings.
///
/// Injected into the estimator so that tests can drive time by hand.
pub trait WallClock: Send + Sync + 'static {
    fn now(&self) -> WallTime;
}

/// Wall clock backed by the operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    #[inline]
    fn now(&self) -> WallTime {
        WallTime::now()
    }
}
