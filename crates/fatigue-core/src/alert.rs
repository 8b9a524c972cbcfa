//! Fatigue alert event emitted by the decision stage

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single "fatigue detected" event
///
/// Emitted at most once per regression cycle, at the moment the cycle
/// completes. Consumers (haptics, logging) receive alerts in cycle order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAlert {
    /// Unique identifier for correlating log lines across tasks
    pub id: Uuid,
    /// Regression cycle (1-based) that raised the alert
    pub cycle: u64,
    /// Slope observed in this cycle
    pub slope: f64,
    /// Slope observed in the previous cycle
    pub previous_slope: f64,
    /// Time-axis value the cycle was fitted at
    pub time_axis: f64,
}

impl FatigueAlert {
    /// Create a new alert with a fresh identifier
    pub fn new(cycle: u64, slope: f64, previous_slope: f64, time_axis: f64) -> Self {
        FatigueAlert {
            id: Uuid::new_v4(),
            cycle,
            slope,
            previous_slope,
            time_axis,
        }
    }

    /// How much steeper this cycle's decline is than the previous one
    pub fn steepening(&self) -> f64 {
        self.previous_slope - self.slope
    }
}

impl std::fmt::Display for FatigueAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fatigue at cycle {} (slope {:.4}, previous {:.4})",
            self.cycle, self.slope, self.previous_slope
        )
    }
}
