//! Configuration for the fatigue pipeline

use fatigue_core::{config_error, validate_channel, FatigueError, FatigueResult};
use serde::{Deserialize, Serialize};

/// How the regression's x-coordinates are laid out within one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxisMode {
    /// The cycle's time step is spread evenly over its windows:
    /// `x[j] = t + j * time_step / HISTORY_LEN`
    #[default]
    Spread,
    /// Every window shares the current time-axis value. The fit is always
    /// degenerate and yields the neutral slope.
    Shared,
}

/// Pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Time-axis increment per regression cycle
    pub time_step: f64,
    /// X-coordinate layout for the regression
    pub x_axis: XAxisMode,
    /// Channel whose slope drives the fatigue decision
    pub decision_channel: usize,
    /// The fit is degenerate when `max(x) - min(x)` is at or below
    /// `degenerate_epsilon * max(|mean x|, 1)`
    pub degenerate_epsilon: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            x_axis: XAxisMode::Spread,
            decision_channel: 0,
            degenerate_epsilon: 1e-12,
        }
    }
}

impl PipelineConfig {
    /// Every window at the same x; each fit degenerates to the neutral slope
    pub fn shared_axis() -> Self {
        Self {
            x_axis: XAxisMode::Shared,
            ..Self::default()
        }
    }

    /// Validate all parameters
    pub fn validate(&self) -> FatigueResult<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(config_error!(
                "pipeline.time_step",
                "must be a positive finite number, got {}",
                self.time_step
            ));
        }

        if !self.degenerate_epsilon.is_finite() || self.degenerate_epsilon <= 0.0 {
            return Err(config_error!(
                "pipeline.degenerate_epsilon",
                "must be a positive finite number, got {}",
                self.degenerate_epsilon
            ));
        }

        validate_channel(self.decision_channel).map_err(|e| {
            FatigueError::invalid_config("pipeline.decision_channel", e.to_string())
        })?;

        Ok(())
    }
}
