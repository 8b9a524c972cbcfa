//! Fixed-width containers for armband readings and per-window RMS values

use crate::error::{FatigueError, FatigueResult};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of EMG electrodes on the armband
pub const CHANNEL_COUNT: usize = 8;

/// Raw samples reduced into one RMS vector
pub const WINDOW_LEN: usize = 25;

/// RMS vectors per regression cycle
pub const HISTORY_LEN: usize = 20;

/// One acquisition tick: a signed 8-bit reading per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSample(pub [i8; CHANNEL_COUNT]);

impl RawSample {
    /// Sample with every channel at zero (what a disconnected device reports)
    pub const fn zeroed() -> Self {
        RawSample([0; CHANNEL_COUNT])
    }

    /// Sample with the same reading on every channel
    pub const fn splat(value: i8) -> Self {
        RawSample([value; CHANNEL_COUNT])
    }

    /// Reading for a channel
    pub fn channel(&self, channel: usize) -> FatigueResult<i8> {
        self.0
            .get(channel)
            .copied()
            .ok_or(FatigueError::ChannelOutOfRange {
                channel,
                channel_count: CHANNEL_COUNT,
            })
    }

    /// Borrow the readings
    pub fn as_array(&self) -> &[i8; CHANNEL_COUNT] {
        &self.0
    }

    /// True when every channel reads zero
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }
}

impl From<[i8; CHANNEL_COUNT]> for RawSample {
    fn from(values: [i8; CHANNEL_COUNT]) -> Self {
        RawSample(values)
    }
}

impl Index<usize> for RawSample {
    type Output = i8;

    fn index(&self, channel: usize) -> &i8 {
        &self.0[channel]
    }
}

/// Root-mean-square per channel over one window of raw samples
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RmsVector(pub [f64; CHANNEL_COUNT]);

impl RmsVector {
    /// RMS for a channel
    pub fn channel(&self, channel: usize) -> FatigueResult<f64> {
        self.0
            .get(channel)
            .copied()
            .ok_or(FatigueError::ChannelOutOfRange {
                channel,
                channel_count: CHANNEL_COUNT,
            })
    }

    /// Borrow the per-channel values
    pub fn as_array(&self) -> &[f64; CHANNEL_COUNT] {
        &self.0
    }

    /// Largest RMS across channels
    pub fn peak(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }
}

impl From<[f64; CHANNEL_COUNT]> for RmsVector {
    fn from(values: [f64; CHANNEL_COUNT]) -> Self {
        RmsVector(values)
    }
}

impl Index<usize> for RmsVector {
    type Output = f64;

    fn index(&self, channel: usize) -> &f64 {
        &self.0[channel]
    }
}

/// Validate a channel index against the armband's channel count
pub fn validate_channel(channel: usize) -> FatigueResult<usize> {
    if channel < CHANNEL_COUNT {
        Ok(channel)
    } else {
        Err(FatigueError::ChannelOutOfRange {
            channel,
            channel_count: CHANNEL_COUNT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sample_access() {
        let sample = RawSample::from([1, -2, 3, -4, 5, -6, 7, -128]);

        assert_eq!(sample[0], 1);
        assert_eq!(sample.channel(7).unwrap(), -128);
        assert_eq!(
            sample.channel(8),
            Err(FatigueError::ChannelOutOfRange { channel: 8, channel_count: 8 })
        );
        assert!(!sample.is_zeroed());
        assert!(RawSample::zeroed().is_zeroed());
        assert_eq!(RawSample::default(), RawSample::zeroed());
    }

    #[test]
    fn test_rms_vector_peak() {
        let rms = RmsVector::from([0.5, 3.0, 1.0, 0.0, 2.5, 0.0, 0.0, 1.5]);
        assert_eq!(rms.peak(), 3.0);
        assert_eq!(rms[1], 3.0);
        assert!(rms.channel(8).is_err());
    }

    #[test]
    fn test_validate_channel() {
        assert_eq!(validate_channel(0), Ok(0));
        assert_eq!(validate_channel(7), Ok(7));
        assert!(validate_channel(8).is_err());
    }

    #[test]
    fn test_sample_serialization() {
        let sample = RawSample::splat(-3);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, "[-3,-3,-3,-3,-3,-3,-3,-3]");
    }
}
