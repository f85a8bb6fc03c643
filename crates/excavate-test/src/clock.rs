//! Wall clocks for tests

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use excavate_core::{WallClock, WallTime};

/// Wall clock moved only by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: WallTime) -> Self {
        ManualClock {
            millis: AtomicI64::new(start.as_millis()),
        }
    }

    pub fn set(&self, t: WallTime) {
        self.millis.store(t.as_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> WallTime {
        WallTime::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Wall clock that follows tokio's clock.
///
/// Under `tokio::time::pause` it advances with virtual time, so timers
/// and interpolation stay in step.
#[derive(Debug)]
pub struct TokioClock {
    base: WallTime,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(base: WallTime) -> Self {
        TokioClock {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl WallClock for TokioClock {
    fn now(&self) -> WallTime {
        self.base.saturating_add(self.start.elapsed())
    }
}
