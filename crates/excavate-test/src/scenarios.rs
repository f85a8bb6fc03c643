//! End-to-end scenarios: sampler -> calibrator -> tiers -> presenter

use std::sync::Arc;
use std::time::Duration;

use excavate_core::{
    ExcavateError, WallClock, WallTime, IMMINENT_THRESHOLD, MYSTERY_PLACEHOLDER, NETWORK_ERROR_MESSAGE,
};
use excavate_runtime::{DisplayBoard, Estimator, EstimatorConfig};
use excavate_time::SlotEstimator;
use excavate_transport::{ClockReading, Sampler};

use crate::{
    reading, unreachable, ChainClockSource, ChainModel, ChainSimulator, ManualClock,
    ScriptedClockSource, TokioClock,
};

const T0: i64 = 1_700_000_000_000;

fn manual_sampler(
    script: Vec<excavate_core::ExcavateResult<ClockReading>>,
) -> (Sampler<ScriptedClockSource, ManualClock>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(WallTime::from_millis(T0)));
    let source = Arc::new(ScriptedClockSource::new(script));
    (Sampler::new(source, Arc::clone(&clock)), clock)
}

#[tokio::test]
async fn test_pipeline_renders_interpolated_board() {
    let (sampler, clock) = manual_sampler(vec![reading(1024, 500)]);
    let mut slots = SlotEstimator::new();

    slots.observe(sampler.fetch_sample().await.unwrap());
    clock.advance(Duration::from_millis(800));

    let state = slots.project(clock.now()).unwrap();
    assert!((state.estimated_slot - 1026.0).abs() < 1e-9);
    assert!((state.estimated_epoch_remaining - 498.0).abs() < 1e-9);

    let board = DisplayBoard::render(&state, IMMINENT_THRESHOLD);
    let jade = board.entry("Jade").unwrap();
    assert_eq!(jade.formatted, "1,022");
    assert!(!jade.imminent);
    assert_eq!(board.entry("Bronze").unwrap().formatted, "498");
    assert_eq!(board.entry("Necrotic").unwrap().formatted, MYSTERY_PLACEHOLDER);
}

#[tokio::test]
async fn test_sampler_feeds_calibration() {
    let (sampler, clock) = manual_sampler(vec![reading(1000, 500), reading(1025, 475)]);
    let mut slots = SlotEstimator::new();

    slots.observe(sampler.fetch_sample().await.unwrap());
    clock.advance(Duration::from_millis(5_000));
    let outcome = slots.observe(sampler.fetch_sample().await.unwrap());

    // 200ms measured, smoothed from 400
    assert!(outcome.is_applied());
    assert!((slots.calibration().slot_duration_ms() - 340.0).abs() < 1e-9);
    assert_eq!(slots.previous().unwrap().slot(), 1000);
    assert_eq!(slots.current().unwrap().slot(), 1025);
}

#[tokio::test]
async fn test_invalid_epoch_info_is_not_a_sample() {
    let (sampler, _) = manual_sampler(vec![Ok(ClockReading::new(5, 10, 11))]);

    assert!(matches!(
        sampler.fetch_sample().await,
        Err(ExcavateError::InvalidEpochInfo { .. })
    ));
}

#[tokio::test]
async fn test_calibration_converges_under_jitter() {
    let clock = Arc::new(ManualClock::new(WallTime::from_millis(T0)));
    let model = ChainModel::nominal(WallTime::from_millis(T0), 250_000_000)
        .with_slot_duration(450.0)
        .with_jitter(40);
    let source = Arc::new(ChainClockSource::new(ChainSimulator::new(model, 11), Arc::clone(&clock)));
    let sampler = Sampler::new(source, Arc::clone(&clock));
    let mut slots = SlotEstimator::new();

    for _ in 0..60 {
        slots.observe(sampler.fetch_sample().await.unwrap());
        clock.advance(Duration::from_secs(5));
    }

    let calibrated = slots.calibration().slot_duration_ms();
    assert!((calibrated - 450.0).abs() < 25.0, "calibrated to {calibrated}");
}

#[tokio::test(start_paused = true)]
async fn test_estimator_tracks_chain() {
    let clock = Arc::new(TokioClock::new(WallTime::from_millis(T0)));
    let model = ChainModel::nominal(WallTime::from_millis(T0), 300_000_000).with_slot_duration(420.0);
    let source = Arc::new(ChainClockSource::new(ChainSimulator::new(model, 5), Arc::clone(&clock)));
    let estimator =
        Estimator::start(Arc::clone(&source), clock, EstimatorConfig::default()).unwrap();

    tokio::time::sleep(Duration::from_millis(62_500)).await;

    let estimate = estimator.estimate().unwrap();
    let truth = source.true_slot();
    assert!(
        (estimate.estimated_slot - truth).abs() < 3.0,
        "estimated {} vs true {truth}",
        estimate.estimated_slot
    );
    assert!(estimator.stats().calibrations_applied >= 10);
    assert!(estimator.calibration().slot_duration_ms() > 400.0);
}

#[tokio::test(start_paused = true)]
async fn test_outage_and_recovery() {
    let clock = Arc::new(TokioClock::new(WallTime::from_millis(T0)));
    let model = ChainModel::nominal(WallTime::from_millis(T0), 1_000);
    let source = Arc::new(ChainClockSource::new(ChainSimulator::new(model, 9), Arc::clone(&clock)));
    let estimator =
        Estimator::start(Arc::clone(&source), clock, EstimatorConfig::default()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    source.fail_next(1);
    tokio::time::sleep(Duration::from_secs(5)).await;

    let snapshot = estimator.snapshot();
    assert_eq!(snapshot.error.as_deref(), Some(NETWORK_ERROR_MESSAGE));
    // Stale baseline keeps counting
    assert!(snapshot.estimate.unwrap().estimated_slot > 1_010.0);

    tokio::time::sleep(Duration::from_secs(5)).await;

    let snapshot = estimator.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.last_updated, "Just now");
    let stats = estimator.stats();
    assert_eq!(stats.samples_failed, 1);
    assert_eq!(stats.samples_ok, 2);
}

#[tokio::test(start_paused = true)]
async fn test_regressed_sample_skips_calibration() {
    let source = Arc::new(ScriptedClockSource::new(vec![reading(1_000, 500), reading(990, 510)]));
    let estimator = Estimator::start(
        source,
        Arc::new(TokioClock::new(WallTime::from_millis(T0))),
        EstimatorConfig::default(),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(5_010)).await;

    let stats = estimator.stats();
    assert_eq!(stats.calibrations_skipped, 1);
    assert_eq!(stats.calibrations_applied, 0);
    assert_eq!(estimator.calibration().slot_duration_ms(), 400.0);
    assert_eq!(estimator.current_sample().unwrap().slot(), 990);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_all_timers() {
    let clock = Arc::new(TokioClock::new(WallTime::from_millis(T0)));
    let model = ChainModel::nominal(WallTime::from_millis(T0), 1_000);
    let source = Arc::new(ChainClockSource::new(ChainSimulator::new(model, 2), Arc::clone(&clock)));
    let estimator =
        Estimator::start(Arc::clone(&source), clock, EstimatorConfig::default()).unwrap();
    tokio::time::sleep(Duration::from_secs(12)).await;

    estimator.shutdown();
    let stats = estimator.stats();
    let reads = source.reads();
    let snapshot = estimator.snapshot();

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(estimator.stats(), stats);
    assert_eq!(source.reads(), reads);
    assert_eq!(estimator.snapshot(), snapshot);
    estimator.dismiss_error();
    assert_eq!(estimator.stats(), stats);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_from_start() {
    let source = Arc::new(ScriptedClockSource::new(vec![unreachable()]));
    let estimator = Estimator::start(
        Arc::clone(&source),
        Arc::new(TokioClock::new(WallTime::from_millis(T0))),
        EstimatorConfig::default(),
    )
    .unwrap();
    tokio::time::sleep(Duration::from_secs(11)).await;

    let snapshot = estimator.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.estimate.is_none());
    assert_eq!(snapshot.board, DisplayBoard::pending());
    assert_eq!(source.reads(), 3);
}
