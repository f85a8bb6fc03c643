//! Estimator - the timer-driven countdown loop
//!
//! One shared baseline (current/previous sample plus calibration) is
//! touched only from timer callbacks, each of which runs to completion
//! under the state lock. The network fetch is the only suspension point;
//! redraws keep interpolating from the previous baseline while it is
//! pending.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use excavate_core::{
    CalibrationState, ExcavateError, ExcavateResult, InterpolatedState, Sample, WallClock,
    WallTime, NETWORK_ERROR_MESSAGE,
};
use excavate_time::{CalibrationOutcome, RateCalibrator, SlotEstimator};
use excavate_transport::{RemoteClockSource, Sampler};

use crate::{format_last_updated, DisplayBoard, DisplaySnapshot, EstimatorConfig};

/// Runtime counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EstimatorStats {
    pub redraw_ticks: u64,
    pub sample_ticks: u64,
    pub label_ticks: u64,
    pub samples_ok: u64,
    pub samples_failed: u64,
    pub calibrations_applied: u64,
    pub calibrations_skipped: u64,
}

/// Mutable region shared by the timers
struct EstimatorState {
    slots: SlotEstimator,
    board: DisplayBoard,
    loading: bool,
    error: Option<String>,
    last_success: Option<WallTime>,
    last_updated: String,
    stats: EstimatorStats,
    /// Manual retries not yet resolved; loading stays up while any remain
    pending_retries: usize,
    /// Set once any fetch attempt has completed
    attempted: bool,
    shut_down: bool,
}

impl EstimatorState {
    fn snapshot(&self, estimate: Option<InterpolatedState>) -> DisplaySnapshot {
        DisplaySnapshot {
            board: self.board.clone(),
            loading: self.loading,
            error: self.error.clone(),
            last_updated: self.last_updated.clone(),
            estimate,
        }
    }
}

struct Shared<S, C> {
    sampler: Sampler<S, C>,
    config: EstimatorConfig,
    state: Mutex<EstimatorState>,
    /// Serialises fetches: at most one is in flight
    fetch_gate: tokio::sync::Mutex<()>,
    display: watch::Sender<DisplaySnapshot>,
}

impl<S: RemoteClockSource, C: WallClock> Shared<S, C> {
    fn now(&self) -> WallTime {
        self.sampler.clock().now()
    }

    /// Interpolate, rebuild the board and publish. Caller holds the lock.
    fn redraw_locked(&self, state: &mut EstimatorState) {
        let estimate = state.slots.project(self.now());
        if let Some(ref interpolated) = estimate {
            state.board = DisplayBoard::render(interpolated, self.config.imminent_threshold);
        }
        self.display.send_replace(state.snapshot(estimate));
    }

    fn publish_locked(&self, state: &EstimatorState) {
        let estimate = state.slots.project(self.now());
        self.display.send_replace(state.snapshot(estimate));
    }

    /// Fast tick. Returns false once torn down.
    fn redraw_tick(&self) -> bool {
        let mut state = self.state.lock();
        if state.shut_down {
            return false;
        }
        state.stats.redraw_ticks += 1;
        self.redraw_locked(&mut state);
        true
    }

    /// Label tick. Returns false once torn down.
    fn label_tick(&self) -> bool {
        let mut state = self.state.lock();
        if state.shut_down {
            return false;
        }
        state.stats.label_ticks += 1;
        state.last_updated = format_last_updated(state.last_success, self.now());
        self.publish_locked(&state);
        true
    }

    /// Count a sampling tick. Returns false once torn down.
    fn begin_sample_tick(&self) -> bool {
        let mut state = self.state.lock();
        if state.shut_down {
            return false;
        }
        state.stats.sample_ticks += 1;
        true
    }

    /// Fetch one sample and fold it into the baseline.
    ///
    /// Failures leave the baseline and calibration untouched and raise the
    /// error flag; they are never propagated out of a timer.
    async fn sample_cycle(&self, manual: bool) -> ExcavateResult<Sample> {
        let _gate = self.fetch_gate.lock().await;
        let result = self.sampler.fetch_sample().await;

        let mut state = self.state.lock();
        if state.shut_down {
            return Err(ExcavateError::ShutDown);
        }
        state.attempted = true;
        // A timer fetch landing first must not hide a pending retry
        let others = state.pending_retries.saturating_sub(usize::from(manual));
        state.loading = others > 0;

        match result {
            Ok(sample) => {
                match state.slots.observe(sample) {
                    CalibrationOutcome::Applied { .. } => state.stats.calibrations_applied += 1,
                    CalibrationOutcome::SlotRegressed { .. }
                    | CalibrationOutcome::ClockSkewed { .. } => {
                        state.stats.calibrations_skipped += 1
                    }
                    CalibrationOutcome::NoPrevious => {}
                }
                state.stats.samples_ok += 1;
                state.error = None;
                state.last_success = Some(sample.observed_at());
                state.last_updated = format_last_updated(state.last_success, self.now());

                // Rebase the board right away rather than on the next fast tick
                self.redraw_locked(&mut state);
                Ok(sample)
            }
            Err(e) => {
                state.stats.samples_failed += 1;
                state.error = Some(NETWORK_ERROR_MESSAGE.to_string());
                self.publish_locked(&state);
                Err(e)
            }
        }
    }
}

/// Countdown estimator.
///
/// Starts its timers on construction and stops them on `shutdown` or drop.
/// After teardown no timer fires and no state changes.
pub struct Estimator<S, C> {
    shared: Arc<Shared<S, C>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
    display: watch::Receiver<DisplaySnapshot>,
}

impl<S: RemoteClockSource, C: WallClock> Estimator<S, C> {
    /// Start sampling, redraw and label timers on the current tokio runtime.
    /// The first sample is fetched immediately.
    pub fn start(source: Arc<S>, clock: Arc<C>, config: EstimatorConfig) -> ExcavateResult<Self> {
        config.validate()?;

        let slots = SlotEstimator::with_calibration(
            CalibrationState::new(config.default_slot_duration_ms),
            RateCalibrator::with_weight(config.smoothing_weight),
        );
        let (display_tx, display_rx) = watch::channel(DisplaySnapshot::initial());
        let (shutdown_tx, _) = watch::channel(false);

        let shared = Arc::new(Shared {
            sampler: Sampler::new(source, clock),
            config,
            state: Mutex::new(EstimatorState {
                slots,
                board: DisplayBoard::pending(),
                loading: true,
                error: None,
                last_success: None,
                last_updated: String::new(),
                stats: EstimatorStats::default(),
                pending_retries: 0,
                attempted: false,
                shut_down: false,
            }),
            fetch_gate: tokio::sync::Mutex::new(()),
            display: display_tx,
        });

        let tasks = vec![
            spawn_sampling(Arc::clone(&shared), shutdown_tx.subscribe()),
            spawn_ticker(
                Arc::clone(&shared),
                shutdown_tx.subscribe(),
                shared.config.redraw_interval,
                |s| s.redraw_tick(),
            ),
            spawn_ticker(
                Arc::clone(&shared),
                shutdown_tx.subscribe(),
                shared.config.label_interval,
                |s| s.label_tick(),
            ),
        ];

        info!(
            sample_ms = shared.config.sample_interval.as_millis() as u64,
            redraw_ms = shared.config.redraw_interval.as_millis() as u64,
            "estimator started"
        );

        Ok(Estimator {
            shared,
            tasks: Mutex::new(tasks),
            shutdown: shutdown_tx,
            display: display_rx,
        })
    }

    /// Fetch immediately, outside the regular cadence.
    ///
    /// Loading is shown until this retry's own fetch resolves, even if a
    /// timer fetch holding the gate lands first. Resolves with `ShutDown`
    /// if the estimator is torn down meanwhile.
    pub async fn retry(&self) -> ExcavateResult<Sample> {
        let mut shutdown = self.shutdown.subscribe();
        {
            let mut state = self.shared.state.lock();
            if state.shut_down {
                return Err(ExcavateError::ShutDown);
            }
            state.pending_retries += 1;
            state.loading = true;
            self.shared.publish_locked(&state);
        }
        let _pending = PendingRetry {
            shared: &*self.shared,
        };

        debug!("manual retry");
        tokio::select! {
            biased;
            _ = shutdown.changed() => Err(ExcavateError::ShutDown),
            result = self.shared.sample_cycle(true) => result,
        }
    }

    /// Clear the visible error without fetching
    pub fn dismiss_error(&self) {
        let mut state = self.shared.state.lock();
        if state.shut_down {
            return;
        }
        state.error = None;
        self.shared.publish_locked(&state);
    }

    /// Latest published display snapshot
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.display.borrow().clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<DisplaySnapshot> {
        self.display.clone()
    }

    /// Project the slot counter to now
    pub fn estimate(&self) -> Option<InterpolatedState> {
        let state = self.shared.state.lock();
        state.slots.project(self.shared.now())
    }

    pub fn calibration(&self) -> CalibrationState {
        self.shared.state.lock().slots.calibration()
    }

    /// Latest successful sample
    pub fn current_sample(&self) -> Option<Sample> {
        self.shared.state.lock().slots.current().copied()
    }

    pub fn stats(&self) -> EstimatorStats {
        self.shared.state.lock().stats.clone()
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.shared.config
    }

    pub(crate) fn now(&self) -> WallTime {
        self.shared.now()
    }
}

impl<S, C> Estimator<S, C> {
    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shut_down
    }

    /// Stop all timers and any pending retry. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.shut_down {
                return;
            }
            state.shut_down = true;
        }

        self.shutdown.send_replace(true);
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        info!("estimator shut down");
    }
}

impl<S, C> Drop for Estimator<S, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Resolves one pending retry when dropped, completed or not
struct PendingRetry<'a, S: RemoteClockSource, C: WallClock> {
    shared: &'a Shared<S, C>,
}

impl<S: RemoteClockSource, C: WallClock> Drop for PendingRetry<'_, S, C> {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        state.pending_retries = state.pending_retries.saturating_sub(1);

        // Abandoned retry: fall back to whatever the timer fetches showed
        if state.pending_retries == 0 && state.attempted && state.loading && !state.shut_down {
            state.loading = false;
            self.shared.publish_locked(&state);
        }
    }
}

fn spawn_sampling<S: RemoteClockSource, C: WallClock>(
    shared: Arc<Shared<S, C>>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // First tick completes immediately: the initial fetch
        let mut ticker = interval(shared.config.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {}
            }
            if !shared.begin_sample_tick() {
                break;
            }
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                result = shared.sample_cycle(false) => {
                    if let Err(ExcavateError::ShutDown) = result {
                        break;
                    }
                }
            }
        }
        debug!("sampling timer stopped");
    })
}

fn spawn_ticker<S: RemoteClockSource, C: WallClock>(
    shared: Arc<Shared<S, C>>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
    on_tick: fn(&Shared<S, C>) -> bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if !on_tick(&shared) {
                        break;
                    }
                }
            }
        }
    })
}

/// Log-only guard for callers that drop a retry result
pub fn log_retry_result(result: &ExcavateResult<Sample>) {
    match result {
        Ok(sample) => debug!(slot = sample.slot(), "retry succeeded"),
        Err(ExcavateError::ShutDown) => {}
        Err(e) => warn!(error = %e, "retry failed"),
    }
}
