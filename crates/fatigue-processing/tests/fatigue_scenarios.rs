//! End-to-end fatigue scenarios driven sample by sample

use fatigue_core::{RawSample, CHANNEL_COUNT, HISTORY_LEN, WINDOW_LEN};
use fatigue_processing::{DecisionState, FatiguePipeline, PipelineConfig, XAxisMode};

const CYCLE_SAMPLES: usize = WINDOW_LEN * HISTORY_LEN;

/// One cycle where window `k` holds `level(k)` on channel 0 and a steady
/// level on the other channels
fn cycle(level: impl Fn(usize) -> i8) -> Vec<RawSample> {
    let mut samples = Vec::with_capacity(CYCLE_SAMPLES);
    for k in 0..HISTORY_LEN {
        let mut values = [40i8; CHANNEL_COUNT];
        values[0] = level(k);
        for _ in 0..WINDOW_LEN {
            samples.push(RawSample::from(values));
        }
    }
    samples
}

#[test]
fn test_alert_coincides_with_second_cycle() {
    let mut pipeline = FatiguePipeline::default();
    let mut samples = cycle(|k| (20 - k) as i8);
    samples.extend(cycle(|k| (100 - 3 * k) as i8));

    let mut alerts = Vec::new();
    for (i, sample) in samples.into_iter().enumerate() {
        if let Some(alert) = pipeline.tick(sample) {
            alerts.push((i, alert));
        }
    }

    assert_eq!(alerts.len(), 1, "expected exactly one alert");
    let (index, alert) = &alerts[0];
    assert_eq!(*index, 2 * CYCLE_SAMPLES - 1);
    assert_eq!(alert.cycle, 2);
    assert!(alert.slope < alert.previous_slope);
    assert!(alert.slope < 0.0);
}

#[test]
fn test_no_alert_during_first_cycle_even_when_declining() {
    let mut pipeline = FatiguePipeline::default();
    let alerts = pipeline.tick_all(cycle(|k| (120 - 6 * k) as i8));

    assert!(alerts.is_empty());
    assert_eq!(pipeline.stats().cycles_completed, 1);
    let slope = pipeline.last_slopes().unwrap().slope(0).unwrap();
    assert!(slope < 0.0);
    assert_eq!(pipeline.decision_state(), DecisionState::Armed { previous_slope: slope });
}

#[test]
fn test_slower_decline_and_recovery_do_not_alert() {
    let mut pipeline = FatiguePipeline::default();
    let mut alerts = pipeline.tick_all(cycle(|k| (100 - 3 * k) as i8));
    // declining, but less steeply
    alerts.extend(pipeline.tick_all(cycle(|k| (60 - k) as i8)));
    // recovering
    alerts.extend(pipeline.tick_all(cycle(|k| (20 + 2 * k) as i8)));

    assert!(alerts.is_empty());
    assert_eq!(pipeline.stats().cycles_completed, 3);
}

#[test]
fn test_one_alert_per_qualifying_cycle() {
    let mut pipeline = FatiguePipeline::default();
    pipeline.tick_all(cycle(|k| (60 - k) as i8));

    let mut cycles_alerted = Vec::new();
    for rate in [2usize, 3, 4] {
        for alert in pipeline.tick_all(cycle(|k| (100 - rate * k) as i8)) {
            cycles_alerted.push(alert.cycle);
        }
    }

    assert_eq!(cycles_alerted, vec![2, 3, 4]);
}

#[test]
fn test_decision_follows_configured_channel() {
    let config = PipelineConfig {
        decision_channel: 5,
        ..PipelineConfig::default()
    };
    let mut pipeline = FatiguePipeline::new(config).unwrap();

    // channel 0 declines steeply but channel 5 stays flat
    let mut alerts = pipeline.tick_all(cycle(|k| (20 - k) as i8));
    alerts.extend(pipeline.tick_all(cycle(|k| (100 - 3 * k) as i8)));

    assert!(alerts.is_empty());
}

#[test]
fn test_time_axis_advances_per_cycle() {
    let mut pipeline = FatiguePipeline::default();
    for n in 1..=3 {
        pipeline.tick_all(cycle(|_| 10));
        assert!((pipeline.time_axis() - 0.1 * n as f64).abs() < 1e-12);
    }
}

#[test]
fn test_shared_axis_fallback_is_repeatable() {
    let config = PipelineConfig {
        x_axis: XAxisMode::Shared,
        ..PipelineConfig::default()
    };

    let run = || {
        let mut pipeline = FatiguePipeline::new(config.clone()).unwrap();
        let mut slopes = Vec::new();
        for rate in [1usize, 2, 3] {
            pipeline.tick_all(cycle(|k| (80 - rate * k) as i8));
            slopes.push(pipeline.last_slopes().unwrap().slopes());
        }
        slopes
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert!(first.iter().flatten().all(|&s| s == 0.0));
}

#[test]
fn test_shared_axis_never_alerts_on_fractional_rms() {
    let mut pipeline = FatiguePipeline::new(PipelineConfig::shared_axis()).unwrap();

    let mut alerts = Vec::new();
    for n in 0..10usize {
        // alternating values within a window give non-integer RMS
        let samples: Vec<RawSample> = (0..CYCLE_SAMPLES)
            .map(|i| {
                let window = i / WINDOW_LEN;
                let base = 120 - (n + 1) * window / 4;
                let value = if i % 2 == 0 { base } else { base / 3 };
                RawSample::splat(value as i8)
            })
            .collect();
        alerts.extend(pipeline.tick_all(samples));

        let slopes = pipeline.last_slopes().unwrap();
        assert!(slopes.fits.iter().all(|f| f.degenerate));
        assert!(slopes.slopes().iter().all(|s| s.to_bits() == 0.0f64.to_bits()));
    }

    assert!(alerts.is_empty());
    assert_eq!(pipeline.stats().cycles_completed, 10);
}
