//! Remote clock source capability

use std::future::Future;

use excavate_core::{ExcavateError, ExcavateResult};

/// A point read of the remote slot counter and epoch progress
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockReading {
    /// Current slot
    pub slot: u64,
    /// Slots in the current epoch
    pub slots_in_epoch: u64,
    /// Position of the current slot within the epoch
    pub slot_index: u64,
}

impl ClockReading {
    pub fn new(slot: u64, slots_in_epoch: u64, slot_index: u64) -> Self {
        ClockReading {
            slot,
            slots_in_epoch,
            slot_index,
        }
    }

    /// Slots left before the epoch boundary
    pub fn epoch_slots_remaining(&self) -> ExcavateResult<u64> {
        self.slots_in_epoch
            .checked_sub(self.slot_index)
            .ok_or(ExcavateError::InvalidEpochInfo {
                slot_index: self.slot_index,
                slots_in_epoch: self.slots_in_epoch,
            })
    }
}

/// Authoritative source of the slot counter.
///
/// Passed into the estimator explicitly so it can be swapped for a fake in
/// tests. Both halves of a reading are expected to be fetched together.
pub trait RemoteClockSource: Send + Sync + 'static {
    fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send;
}

impl<S: RemoteClockSource> RemoteClockSource for std::sync::Arc<S> {
    fn read(&self) -> impl Future<Output = ExcavateResult<ClockReading>> + Send {
        (**self).read()
    }
}
