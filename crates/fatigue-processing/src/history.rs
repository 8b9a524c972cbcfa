//! Cyclic trend history of RMS windows

use fatigue_core::{RmsVector, HISTORY_LEN};

/// Ring of the most recent [`HISTORY_LEN`] RMS vectors since the last wrap
///
/// Entries are overwritten in place at the cycle index. The full buffer is
/// handed out exactly when the index wraps back to zero.
#[derive(Debug, Clone)]
pub struct TrendHistory {
    entries: [RmsVector; HISTORY_LEN],
    cycle_index: usize,
    cycles_completed: u64,
}

impl TrendHistory {
    /// Create an empty history
    pub fn new() -> Self {
        TrendHistory {
            entries: [RmsVector::default(); HISTORY_LEN],
            cycle_index: 0,
            cycles_completed: 0,
        }
    }

    /// Store one RMS vector; returns the full buffer when the cycle completes
    pub fn push(&mut self, rms: RmsVector) -> Option<&[RmsVector; HISTORY_LEN]> {
        self.entries[self.cycle_index] = rms;
        self.cycle_index += 1;

        if self.cycle_index < HISTORY_LEN {
            return None;
        }

        self.cycle_index = 0;
        self.cycles_completed += 1;
        Some(&self.entries)
    }

    /// Entries written since the last wrap
    pub fn len(&self) -> usize {
        self.cycle_index
    }

    /// True when the current cycle has no entries yet
    pub fn is_empty(&self) -> bool {
        self.cycle_index == 0
    }

    /// Number of times the buffer has filled
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Restart the cycle and counters
    pub fn reset(&mut self) {
        self.cycle_index = 0;
        self.cycles_completed = 0;
    }
}

impl Default for TrendHistory {
    fn default() -> Self {
        Self::new()
    }
}
