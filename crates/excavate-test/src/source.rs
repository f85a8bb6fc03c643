//! Scripted remote clock sources

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use excavate_core::{ExcavateError, ExcavateResult};
use excavate_transport::{ClockReading, RemoteClockSource};

/// Replays a script of readings and failures.
///
/// Once the script runs out the last entry repeats; an empty script
/// always fails.
#[derive(Debug)]
pub struct ScriptedClockSource {
    script: Mutex<VecDeque<ExcavateResult<ClockReading>>>,
    last: Mutex<Option<ExcavateResult<ClockReading>>>,
    reads: AtomicUsize,
    delay: Duration,
}

impl ScriptedClockSource {
    pub fn new(script: Vec<ExcavateResult<ClockReading>>) -> Self {
        ScriptedClockSource {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            reads: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Delay every read by `delay` (tokio time)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Append to the script
    pub fn push(&self, entry: ExcavateResult<ClockReading>) {
        self.script.lock().push_back(entry);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn next(&self) -> ExcavateResult<ClockReading> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock();
        let mut last = self.last.lock();
        match script.pop_front() {
            Some(entry) => {
                *last = Some(entry.clone());
                entry
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(ExcavateError::Network("script exhausted".into()))),
        }
    }
}

impl RemoteClockSource for ScriptedClockSource {
    fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send {
        let result = self.next();
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

/// Reading helper: `remaining` slots left in a 432,000-slot epoch
pub fn reading(slot: u64, remaining: u64) -> ExcavateResult<ClockReading> {
    Ok(ClockReading::new(slot, 432_000, 432_000 - remaining.min(432_000)))
}

/// Failure helper
pub fn unreachable() -> ExcavateResult<ClockReading> {
    Err(ExcavateError::Network("connection refused".into()))
}
