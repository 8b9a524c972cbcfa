//! Fatigue decision: compares each cycle's slope with the previous one

use fatigue_core::FatigueAlert;
use serde::{Deserialize, Serialize};

/// Decision stage state carried across regression cycles
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DecisionState {
    /// No cycle has completed yet
    #[default]
    Unset,
    /// At least one slope has been recorded
    Armed { previous_slope: f64 },
}

/// Raises an alert when the trend declines more steeply than last cycle
#[derive(Debug, Clone, Default)]
pub struct FatigueDecision {
    state: DecisionState,
}

impl FatigueDecision {
    /// Create a new decision stage in the `Unset` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one cycle's slope
    ///
    /// Alerts iff `slope < 0` and `slope < previous_slope`. The first cycle
    /// only arms the stage. The slope is always recorded for the next cycle.
    pub fn observe(&mut self, slope: f64, cycle: u64, time_axis: f64) -> Option<FatigueAlert> {
        let alert = match self.state {
            DecisionState::Unset => None,
            DecisionState::Armed { previous_slope } => (slope < 0.0 && slope < previous_slope)
                .then(|| FatigueAlert::new(cycle, slope, previous_slope, time_axis)),
        };

        self.state = DecisionState::Armed { previous_slope: slope };
        alert
    }

    /// Get the current state
    pub fn state(&self) -> DecisionState {
        self.state
    }

    /// Slope recorded by the most recent cycle, if any
    pub fn previous_slope(&self) -> Option<f64> {
        match self.state {
            DecisionState::Unset => None,
            DecisionState::Armed { previous_slope } => Some(previous_slope),
        }
    }

    /// Forget the previous slope; the next cycle only re-arms
    pub fn reset(&mut self) {
        self.state = DecisionState::Unset;
    }
}
