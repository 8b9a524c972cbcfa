//! Fixed-length RMS windowing of raw armband samples

use fatigue_core::{RawSample, RmsVector, CHANNEL_COUNT, WINDOW_LEN};

/// Collects [`WINDOW_LEN`] samples and reduces them to one RMS per channel
///
/// The window is never partially flushed: the cursor only returns to zero
/// once every slot has been written.
#[derive(Debug, Clone)]
pub struct RmsWindower {
    window: [RawSample; WINDOW_LEN],
    cursor: usize,
}

impl RmsWindower {
    /// Create an empty windower
    pub fn new() -> Self {
        RmsWindower {
            window: [RawSample::zeroed(); WINDOW_LEN],
            cursor: 0,
        }
    }

    /// Append one sample; returns the RMS vector when the window fills
    pub fn push(&mut self, sample: RawSample) -> Option<RmsVector> {
        self.window[self.cursor] = sample;
        self.cursor += 1;

        if self.cursor < WINDOW_LEN {
            return None;
        }

        self.cursor = 0;
        Some(window_rms(&self.window))
    }

    /// Samples collected in the current, incomplete window
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// True when no samples are pending
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Discard any pending samples
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl Default for RmsWindower {
    fn default() -> Self {
        Self::new()
    }
}

/// RMS of each channel over a full window
///
/// Squares are summed in `i32`: the worst case is 25 * 128^2, well inside range.
pub fn window_rms(window: &[RawSample; WINDOW_LEN]) -> RmsVector {
    let mut sum_sq = [0i32; CHANNEL_COUNT];

    for sample in window {
        for (acc, &value) in sum_sq.iter_mut().zip(sample.as_array()) {
            let value = i32::from(value);
            *acc += value * value;
        }
    }

    let mut rms = [0.0f64; CHANNEL_COUNT];
    for (out, &acc) in rms.iter_mut().zip(&sum_sq) {
        *out = (f64::from(acc) / WINDOW_LEN as f64).sqrt();
    }

    RmsVector(rms)
}
