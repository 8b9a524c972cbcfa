//! Drives the fatigue pipeline from the sample stream

use fatigue_core::{FatigueAlert, RawSample};
use fatigue_processing::{FatiguePipeline, PipelineStats};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Why the monitor loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The sample stream closed
    StreamEnded,
    /// `max_ticks` samples were processed
    TickLimit,
    /// The shutdown future completed
    Shutdown,
}

/// Outcome of a monitor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub stop_reason: StopReason,
    pub pipeline: PipelineStats,
    pub alerts_delivered: u64,
    pub alerts_dropped: u64,
    /// Longest run of all-zero samples seen
    pub longest_silence: u64,
}

/// Single consumer of the sample stream
///
/// Owns the pipeline, so every sample is ticked in arrival order on one task.
pub struct Monitor {
    pipeline: FatiguePipeline,
    alerts: mpsc::Sender<FatigueAlert>,
    max_ticks: Option<u64>,
    silence_threshold: u64,
    silence_run: u64,
    longest_silence: u64,
    alerts_delivered: u64,
    alerts_dropped: u64,
}

impl Monitor {
    /// `silence_threshold` is the number of consecutive zeroed samples
    /// after which a lost-contact warning is logged
    pub fn new(
        pipeline: FatiguePipeline,
        alerts: mpsc::Sender<FatigueAlert>,
        max_ticks: Option<u64>,
        silence_threshold: u64,
    ) -> Self {
        Self {
            pipeline,
            alerts,
            max_ticks,
            silence_threshold: silence_threshold.max(1),
            silence_run: 0,
            longest_silence: 0,
            alerts_delivered: 0,
            alerts_dropped: 0,
        }
    }

    /// Consume samples until the stream closes, the tick limit is reached
    /// or `shutdown` resolves
    pub async fn run<F>(mut self, mut samples: mpsc::Receiver<RawSample>, shutdown: F) -> MonitorSummary
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(max_ticks = ?self.max_ticks, "monitor started");

        let stop_reason = loop {
            if self.limit_reached() {
                break StopReason::TickLimit;
            }

            tokio::select! {
                sample = samples.recv() => {
                    match sample {
                        Some(sample) => self.handle_sample(sample),
                        None => {
                            debug!("sample stream closed");
                            break StopReason::StreamEnded;
                        }
                    }
                }

                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break StopReason::Shutdown;
                }
            }
        };

        let summary = MonitorSummary {
            stop_reason,
            pipeline: self.pipeline.stats().clone(),
            alerts_delivered: self.alerts_delivered,
            alerts_dropped: self.alerts_dropped,
            longest_silence: self.longest_silence.max(self.silence_run),
        };
        info!(
            reason = ?summary.stop_reason,
            samples = summary.pipeline.samples_processed,
            cycles = summary.pipeline.cycles_completed,
            alerts = summary.pipeline.alerts_raised,
            "monitor finished"
        );
        summary
    }

    fn limit_reached(&self) -> bool {
        self.max_ticks
            .is_some_and(|max| self.pipeline.stats().samples_processed >= max)
    }

    fn handle_sample(&mut self, sample: RawSample) {
        self.track_silence(&sample);

        if let Some(alert) = self.pipeline.tick(sample) {
            self.forward(alert);
        }
    }

    fn track_silence(&mut self, sample: &RawSample) {
        if sample.is_zeroed() {
            self.silence_run += 1;
            if self.silence_run == self.silence_threshold {
                warn!(samples = self.silence_run, "armband reads all zeros, check contact");
            }
            return;
        }

        if self.silence_run >= self.silence_threshold {
            info!(samples = self.silence_run, "armband signal restored");
        }
        self.longest_silence = self.longest_silence.max(self.silence_run);
        self.silence_run = 0;
    }

    fn forward(&mut self, alert: FatigueAlert) {
        match self.alerts.try_send(alert) {
            Ok(()) => self.alerts_delivered += 1,
            Err(TrySendError::Full(alert)) => {
                self.alerts_dropped += 1;
                warn!(alert_id = %alert.id, "haptic queue full, alert dropped");
            }
            Err(TrySendError::Closed(alert)) => {
                self.alerts_dropped += 1;
                warn!(alert_id = %alert.id, "haptic driver gone, alert dropped");
            }
        }
    }
}
