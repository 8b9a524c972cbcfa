//! Fatigue pipeline chaining windowing, history, regression and decision

use crate::config::PipelineConfig;
use crate::decision::{DecisionState, FatigueDecision};
use crate::history::TrendHistory;
use crate::regression::{SlopeEstimator, SlopeResult};
use crate::rms::RmsWindower;
use fatigue_core::{FatigueAlert, FatigueResult, RawSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Counters describing what the pipeline has consumed and produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub samples_processed: u64,
    pub windows_completed: u64,
    pub cycles_completed: u64,
    pub alerts_raised: u64,
}

/// Single-owner streaming pipeline
///
/// Every sample runs through all stages inline in [`tick`](Self::tick);
/// nothing here blocks or allocates.
#[derive(Debug, Clone)]
pub struct FatiguePipeline {
    config: PipelineConfig,
    windower: RmsWindower,
    history: TrendHistory,
    estimator: SlopeEstimator,
    decision: FatigueDecision,
    last_slopes: Option<SlopeResult>,
    stats: PipelineStats,
}

impl FatiguePipeline {
    /// Create a pipeline after validating its configuration
    pub fn new(config: PipelineConfig) -> FatigueResult<Self> {
        config.validate()?;

        Ok(FatiguePipeline {
            estimator: SlopeEstimator::new(&config),
            config,
            windower: RmsWindower::new(),
            history: TrendHistory::new(),
            decision: FatigueDecision::new(),
            last_slopes: None,
            stats: PipelineStats::default(),
        })
    }

    /// Feed one sample; returns an alert when a cycle completes with a
    /// fatigue signature
    pub fn tick(&mut self, sample: RawSample) -> Option<FatigueAlert> {
        self.stats.samples_processed += 1;

        let rms = self.windower.push(sample)?;
        self.stats.windows_completed += 1;
        debug!(
            window = self.stats.windows_completed,
            rms = rms[self.config.decision_channel],
            peak = rms.peak(),
            "rms window complete"
        );

        let history = self.history.push(rms)?;
        let slopes = self.estimator.fit_cycle(history);
        self.stats.cycles_completed += 1;

        let channel = self.config.decision_channel;
        let slope = slopes.fits[channel].slope;
        info!(
            cycle = self.stats.cycles_completed,
            time_axis = slopes.time_axis,
            channel,
            slope,
            degenerate = slopes.fits[channel].degenerate,
            "regression cycle complete"
        );

        self.last_slopes = Some(slopes);

        let alert = self
            .decision
            .observe(slope, self.stats.cycles_completed, slopes.time_axis)?;
        self.stats.alerts_raised += 1;
        warn!(
            alert_id = %alert.id,
            cycle = alert.cycle,
            slope = alert.slope,
            previous_slope = alert.previous_slope,
            steepening = alert.steepening(),
            "fatigue detected"
        );

        Some(alert)
    }

    /// Feed a batch of samples, collecting every alert in order
    pub fn tick_all<I>(&mut self, samples: I) -> Vec<FatigueAlert>
    where
        I: IntoIterator<Item = RawSample>,
    {
        samples.into_iter().filter_map(|s| self.tick(s)).collect()
    }

    /// Get the validated configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the running counters
    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Fits from the most recent regression cycle
    pub fn last_slopes(&self) -> Option<&SlopeResult> {
        self.last_slopes.as_ref()
    }

    /// Time-axis value the next cycle will be fitted at
    pub fn time_axis(&self) -> f64 {
        self.estimator.time_axis()
    }

    /// Get the decision stage state
    pub fn decision_state(&self) -> DecisionState {
        self.decision.state()
    }

    /// Samples buffered toward the next RMS window
    pub fn pending_samples(&self) -> usize {
        self.windower.len()
    }

    /// Windows buffered toward the next regression cycle
    pub fn pending_windows(&self) -> usize {
        self.history.len()
    }

    /// Clear all buffers, counters, the time axis and the decision state
    pub fn reset(&mut self) {
        self.windower.reset();
        self.history.reset();
        self.estimator.reset();
        self.decision.reset();
        self.last_slopes = None;
        self.stats = PipelineStats::default();
    }
}

impl Default for FatiguePipeline {
    fn default() -> Self {
        let config = PipelineConfig::default();
        FatiguePipeline {
            estimator: SlopeEstimator::new(&config),
            config,
            windower: RmsWindower::new(),
            history: TrendHistory::new(),
            decision: FatigueDecision::new(),
            last_slopes: None,
            stats: PipelineStats::default(),
        }
    }
}
