//! Sampler - turns remote clock readings into stamped samples

use std::sync::Arc;

use tracing::{debug, warn};

use excavate_core::{ExcavateResult, Sample, WallClock};

use crate::RemoteClockSource;

/// Fetches `(slot, epochSlotsRemaining, observedAt)` from a clock source.
///
/// `observedAt` is taken from the injected wall clock once the reading
/// has fully arrived. The sampler holds no state of its own; retry policy
/// belongs to the caller.
pub struct Sampler<S, C> {
    source: Arc<S>,
    clock: Arc<C>,
}

impl<S: RemoteClockSource, C: WallClock> Sampler<S, C> {
    pub fn new(source: Arc<S>, clock: Arc<C>) -> Self {
        Sampler { source, clock }
    }

    /// Fetch one sample
    pub async fn fetch_sample(&self) -> ExcavateResult<Sample> {
        let reading = match self.source.read().await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "slot sample failed");
                return Err(e);
            }
        };

        let remaining = reading.epoch_slots_remaining().map_err(|e| {
            warn!(error = %e, "rejected epoch info");
            e
        })?;
        let sample = Sample::new(reading.slot, remaining, self.clock.now());

        debug!(
            slot = sample.slot(),
            epoch_remaining = sample.epoch_slots_remaining(),
            observed_at = sample.observed_at().as_millis(),
            "slot sample"
        );
        Ok(sample)
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }
}

impl<S, C> Clone for Sampler<S, C> {
    fn clone(&self) -> Self {
        Sampler {
            source: Arc::clone(&self.source),
            clock: Arc::clone(&self.clock),
        }
    }
}
