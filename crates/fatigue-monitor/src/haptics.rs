//! Haptic feedback for fatigue alerts

use fatigue_core::{config_error, FatigueAlert, FatigueResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Vibration lengths supported by the armband
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationKind {
    Short,
    Medium,
    Long,
}

impl VibrationKind {
    /// How long the motor runs for this kind
    pub fn duration(self) -> Duration {
        match self {
            VibrationKind::Short => Duration::from_millis(150),
            VibrationKind::Medium => Duration::from_millis(400),
            VibrationKind::Long => Duration::from_millis(1000),
        }
    }
}

/// Something that can buzz
pub trait Vibrator: Send {
    fn vibrate(&mut self, kind: VibrationKind) -> FatigueResult<()>;
}

/// Vibrator that only logs, used with the simulated armband
#[derive(Debug, Default)]
pub struct LogVibrator {
    pulses: u64,
}

impl Vibrator for LogVibrator {
    fn vibrate(&mut self, kind: VibrationKind) -> FatigueResult<()> {
        self.pulses += 1;
        debug!(?kind, pulse = self.pulses, "vibrate");
        Ok(())
    }
}

/// Vibrator that records every pulse; clones share the same record
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingVibrator {
    pulses: std::sync::Arc<std::sync::Mutex<Vec<VibrationKind>>>,
}

#[cfg(test)]
impl RecordingVibrator {
    /// Create a new recorder with no pulses
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses played so far, oldest first
    pub fn pulses(&self) -> Vec<VibrationKind> {
        self.pulses.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Vibrator for RecordingVibrator {
    fn vibrate(&mut self, kind: VibrationKind) -> FatigueResult<()> {
        if let Ok(mut pulses) = self.pulses.lock() {
            pulses.push(kind);
        }
        Ok(())
    }
}

/// Ordered sequence of pulses played for one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapticPattern {
    pulses: Vec<VibrationKind>,
}

impl HapticPattern {
    /// One medium buzz followed by two short ones
    pub const FATIGUE_UNIT: [VibrationKind; 3] =
        [VibrationKind::Medium, VibrationKind::Short, VibrationKind::Short];

    /// `unit` played `repetitions` times back to back
    pub fn repeated(unit: &[VibrationKind], repetitions: usize) -> Self {
        let pulses = unit
            .iter()
            .copied()
            .cycle()
            .take(unit.len() * repetitions)
            .collect();
        Self { pulses }
    }

    /// Five rounds of medium-short-short
    pub fn fatigue_default() -> Self {
        Self::repeated(&Self::FATIGUE_UNIT, 5)
    }

    /// Get the pulses in playback order
    pub fn pulses(&self) -> &[VibrationKind] {
        &self.pulses
    }

    /// Number of pulses
    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    /// True when the pattern has no pulses
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Wall time to play the pattern with `gap` after each pulse
    pub fn total_duration(&self, gap: Duration) -> Duration {
        self.pulses.iter().map(|k| k.duration() + gap).sum()
    }
}

/// Haptic feedback options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    /// Play patterns at all; when false alerts are only logged
    pub enabled: bool,
    /// Rounds of medium-short-short per alert
    pub repetitions: usize,
    /// Pause after each pulse
    pub pulse_gap_ms: u64,
    /// Alerts queued for the driver before new ones are dropped
    pub alert_buffer: usize,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repetitions: 5,
            pulse_gap_ms: 100,
            alert_buffer: 8,
        }
    }
}

impl HapticConfig {
    /// Validate all parameters
    pub fn validate(&self) -> FatigueResult<()> {
        if self.repetitions == 0 || self.repetitions > 50 {
            return Err(config_error!(
                "haptics.repetitions",
                "must be within 1..=50, got {}",
                self.repetitions
            ));
        }
        if self.alert_buffer == 0 {
            return Err(config_error!("haptics.alert_buffer", "must be at least 1"));
        }
        Ok(())
    }

    /// Build the per-alert pattern
    pub fn pattern(&self) -> HapticPattern {
        HapticPattern::repeated(&HapticPattern::FATIGUE_UNIT, self.repetitions)
    }

    /// Pause after each pulse
    pub fn pulse_gap(&self) -> Duration {
        Duration::from_millis(self.pulse_gap_ms)
    }
}

/// Totals reported when the driver stops
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticStats {
    pub alerts_played: u64,
    pub pulses_played: u64,
    pub pulse_failures: u64,
}

/// Plays the alert pattern on a [`Vibrator`] for each alert received
pub struct HapticDriver<V: Vibrator> {
    config: HapticConfig,
    pattern: HapticPattern,
    vibrator: V,
    stats: HapticStats,
}

impl<V: Vibrator> HapticDriver<V> {
    /// Create a new driver after validating its configuration
    pub fn new(config: HapticConfig, vibrator: V) -> FatigueResult<Self> {
        config.validate()?;
        Ok(Self {
            pattern: config.pattern(),
            config,
            vibrator,
            stats: HapticStats::default(),
        })
    }

    /// Play alerts in arrival order until every sender is dropped
    pub async fn run(mut self, mut alerts: mpsc::Receiver<FatigueAlert>) -> HapticStats {
        info!(
            enabled = self.config.enabled,
            pulses = self.pattern.len(),
            pattern_ms = self.pattern.total_duration(self.config.pulse_gap()).as_millis() as u64,
            "haptic driver started"
        );

        while let Some(alert) = alerts.recv().await {
            if !self.config.enabled {
                info!(alert_id = %alert.id, "haptics disabled, alert not played");
                continue;
            }
            self.play(&alert).await;
        }

        info!(alerts = self.stats.alerts_played, "haptic driver finished");
        self.stats
    }

    async fn play(&mut self, alert: &FatigueAlert) {
        debug!(alert_id = %alert.id, cycle = alert.cycle, "playing fatigue pattern");
        let gap = self.config.pulse_gap();

        for &kind in self.pattern.pulses() {
            match self.vibrator.vibrate(kind) {
                Ok(()) => self.stats.pulses_played += 1,
                Err(e) => {
                    self.stats.pulse_failures += 1;
                    warn!(error = %e, ?kind, "vibration failed");
                }
            }
            sleep(kind.duration() + gap).await;
        }

        self.stats.alerts_played += 1;
    }
}
