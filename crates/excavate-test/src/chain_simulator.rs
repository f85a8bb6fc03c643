//! Chain Simulator - a slot clock that advances with wall time
//!
//! Simulates:
//! - A chain producing slots at a configurable (and changeable) rate
//! - Epoch boundaries
//! - Observation jitter between the chain and the local clock
//! - Network outages

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use excavate_core::{ExcavateError, ExcavateResult, WallClock, WallTime};
use excavate_transport::{ClockReading, RemoteClockSource};

/// Chain parameters
#[derive(Clone, Debug)]
pub struct ChainModel {
    /// Wall time at which `start_slot` was produced
    pub genesis: WallTime,
    pub start_slot: u64,
    /// True slot duration
    pub slot_duration_ms: f64,
    pub slots_in_epoch: u64,
    /// Max observation error, either direction
    pub jitter_ms: u32,
}

impl ChainModel {
    /// Steady chain at the nominal 400ms slot
    pub fn nominal(genesis: WallTime, start_slot: u64) -> Self {
        ChainModel {
            genesis,
            start_slot,
            slot_duration_ms: 400.0,
            slots_in_epoch: 432_000,
            jitter_ms: 0,
        }
    }

    pub fn with_slot_duration(mut self, slot_duration_ms: f64) -> Self {
        self.slot_duration_ms = slot_duration_ms;
        self
    }

    pub fn with_jitter(mut self, jitter_ms: u32) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    pub fn with_epoch_length(mut self, slots_in_epoch: u64) -> Self {
        self.slots_in_epoch = slots_in_epoch.max(1);
        self
    }
}

/// Deterministic chain state for a given seed
#[derive(Debug)]
pub struct ChainSimulator {
    model: ChainModel,
    /// Slot reached when the rate last changed
    anchor_slot: f64,
    anchor_time: WallTime,
    rng: StdRng,
}

impl ChainSimulator {
    pub fn new(model: ChainModel, seed: u64) -> Self {
        ChainSimulator {
            anchor_slot: model.start_slot as f64,
            anchor_time: model.genesis,
            model,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn model(&self) -> &ChainModel {
        &self.model
    }

    /// Exact (fractional) slot at `now`
    pub fn true_slot(&self, now: WallTime) -> f64 {
        let elapsed = now.millis_since(self.anchor_time).max(0) as f64;
        self.anchor_slot + elapsed / self.model.slot_duration_ms
    }

    /// Change the production rate from `now` on. Slots already produced stay.
    pub fn set_slot_duration(&mut self, now: WallTime, slot_duration_ms: f64) {
        self.anchor_slot = self.true_slot(now);
        self.anchor_time = now;
        self.model.slot_duration_ms = slot_duration_ms;
    }

    /// What the chain reports when asked at `now`, jitter applied
    pub fn reading_at(&mut self, now: WallTime) -> ClockReading {
        let jitter = if self.model.jitter_ms > 0 {
            let bound = self.model.jitter_ms as i64;
            self.rng.gen_range(-bound..=bound)
        } else {
            0
        };
        let observed = WallTime::from_millis(now.as_millis() + jitter);

        let slot = self.true_slot(observed).floor() as u64;
        let slots_in_epoch = self.model.slots_in_epoch;
        ClockReading::new(slot, slots_in_epoch, slot % slots_in_epoch)
    }
}

/// Remote clock source backed by a simulated chain
pub struct ChainClockSource<C> {
    chain: Mutex<ChainSimulator>,
    clock: Arc<C>,
    fail_next: AtomicUsize,
    reads: AtomicUsize,
}

impl<C: WallClock> ChainClockSource<C> {
    pub fn new(chain: ChainSimulator, clock: Arc<C>) -> Self {
        ChainClockSource {
            chain: Mutex::new(chain),
            clock,
            fail_next: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` reads fail as if the endpoint were down
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn set_slot_duration(&self, slot_duration_ms: f64) {
        self.chain
            .lock()
            .set_slot_duration(self.clock.now(), slot_duration_ms);
    }

    pub fn true_slot(&self) -> f64 {
        self.chain.lock().true_slot(self.clock.now())
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn next(&self) -> ExcavateResult<ClockReading> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExcavateError::Network("simulated outage".into()));
        }
        Ok(self.chain.lock().reading_at(self.clock.now()))
    }
}

impl<C: WallClock> RemoteClockSource for ChainClockSource<C> {
    fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send {
        let result = self.next();
        async move { result }
    }
}
