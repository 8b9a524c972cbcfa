//! Simulated 8-channel EMG armband

use crate::signal_patterns::SignalPattern;
use fatigue_core::{config_error, FatigueError, FatigueResult, RawSample, CHANNEL_COUNT};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Noise added on top of the muscle signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Gaussian noise standard deviation in raw counts (0.0 = no noise)
    pub gaussian_std: f32,
    /// Motion artifact probability per sample (0.0 to 1.0)
    pub motion_artifact_prob: f32,
    /// Motion artifact amplitude in raw counts
    pub motion_artifact_amp: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            gaussian_std: 2.0,
            motion_artifact_prob: 0.002,
            motion_artifact_amp: 40.0,
        }
    }
}

impl NoiseConfig {
    /// No noise at all
    pub fn silent() -> Self {
        Self {
            gaussian_std: 0.0,
            motion_artifact_prob: 0.0,
            motion_artifact_amp: 0.0,
        }
    }
}

/// Configuration for the simulated armband
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Activation profile shared by all channels
    pub pattern: SignalPattern,
    /// Raw-count amplitude at full activation
    pub amplitude: f32,
    /// Per-channel electrode gain
    pub channel_gains: [f32; CHANNEL_COUNT],
    /// Sample cadence used to advance simulated time
    pub sample_rate_hz: f32,
    /// Noise configuration
    pub noise: NoiseConfig,
    /// Time the simulated device takes to pair
    pub pairing_delay_ms: u64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            pattern: SignalPattern::default(),
            amplitude: 100.0,
            channel_gains: [1.0, 0.9, 0.8, 0.6, 0.5, 0.6, 0.8, 0.9],
            sample_rate_hz: 20.0,
            noise: NoiseConfig::default(),
            pairing_delay_ms: 250,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Validate all parameters
    pub fn validate(&self) -> FatigueResult<()> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(config_error!(
                "stream.simulator.sample_rate_hz",
                "must be positive, got {}",
                self.sample_rate_hz
            ));
        }
        if !(0.0..=128.0).contains(&self.amplitude) {
            return Err(config_error!(
                "stream.simulator.amplitude",
                "must be within 0..=128 raw counts, got {}",
                self.amplitude
            ));
        }
        if !(self.noise.gaussian_std.is_finite() && self.noise.gaussian_std >= 0.0) {
            return Err(config_error!(
                "stream.simulator.noise.gaussian_std",
                "must be non-negative, got {}",
                self.noise.gaussian_std
            ));
        }
        if !(0.0..=1.0).contains(&self.noise.motion_artifact_prob) {
            return Err(config_error!(
                "stream.simulator.noise.motion_artifact_prob",
                "must be within 0..=1, got {}",
                self.noise.motion_artifact_prob
            ));
        }
        Ok(())
    }
}

/// Link state between the host and the armband
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Armband simulator producing one [`RawSample`] per call
///
/// Surface EMG is modelled as zero-mean gaussian noise whose envelope
/// follows the activation pattern, so the RMS of a window tracks
/// `amplitude * activation * gain`.
pub struct ArmbandSimulator {
    config: SimulatorConfig,
    rng: rand::rngs::StdRng,
    carrier: Normal<f32>,
    noise: Normal<f32>,
    /// Samples produced since start; time is derived from this count
    ticks: u64,
    connection: ConnectionState,
}

impl ArmbandSimulator {
    /// Create a connected simulator
    pub fn new(config: SimulatorConfig) -> FatigueResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        let carrier = Normal::new(0.0, 1.0)
            .map_err(|e| FatigueError::invalid_config("stream.simulator", e.to_string()))?;
        let noise = Normal::new(0.0, config.noise.gaussian_std)
            .map_err(|e| FatigueError::invalid_config("stream.simulator.noise", e.to_string()))?;

        Ok(ArmbandSimulator {
            config,
            rng,
            carrier,
            noise,
            ticks: 0,
            connection: ConnectionState::Connected,
        })
    }

    /// Produce the next tick's readings
    ///
    /// While disconnected the stale readings are cleared and every channel
    /// reads zero; simulated time still advances.
    pub fn next_sample(&mut self) -> RawSample {
        let time = self.elapsed();
        self.ticks += 1;

        if self.connection == ConnectionState::Disconnected {
            return RawSample::zeroed();
        }

        let envelope = self.config.amplitude * self.config.pattern.activation_at_time(time);
        let mut values = [0i8; CHANNEL_COUNT];

        for (value, &gain) in values.iter_mut().zip(&self.config.channel_gains) {
            let mut reading = envelope * gain * self.carrier.sample(&mut self.rng);
            reading += self.noise.sample(&mut self.rng);

            if self.rng.gen::<f32>() < self.config.noise.motion_artifact_prob {
                reading += self.config.noise.motion_artifact_amp * self.rng.gen_range(-1.0..1.0);
            }

            *value = reading.round().clamp(i8::MIN as f32, i8::MAX as f32) as i8;
        }

        RawSample(values)
    }

    /// Drop the link; subsequent samples are zeroed
    pub fn disconnect(&mut self) {
        if self.connection == ConnectionState::Connected {
            info!("armband disconnected, clearing readings");
        }
        self.connection = ConnectionState::Disconnected;
    }

    /// Restore the link
    pub fn reconnect(&mut self) {
        if self.connection == ConnectionState::Disconnected {
            info!("armband reconnected");
        }
        self.connection = ConnectionState::Connected;
    }

    /// Get the current link state
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Simulated seconds since start
    pub fn elapsed(&self) -> f64 {
        self.ticks as f64 / f64::from(self.config.sample_rate_hz)
    }

    /// Restart the activation profile from time zero
    pub fn reset_time(&mut self) {
        self.ticks = 0;
    }

    /// Get the simulator configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Swap the activation profile without resetting time
    pub fn set_pattern(&mut self, pattern: SignalPattern) {
        debug!(pattern = pattern.description(), "pattern updated");
        self.config.pattern = pattern;
    }
}

/// Pair with the simulated armband, giving up after `timeout`
pub async fn wait_for_device(config: SimulatorConfig, timeout: Duration) -> FatigueResult<ArmbandSimulator> {
    let pairing = Duration::from_millis(config.pairing_delay_ms);
    info!(timeout_ms = timeout.as_millis() as u64, "attempting to find an armband");

    if pairing > timeout {
        tokio::time::sleep(timeout).await;
        return Err(FatigueError::DeviceNotFound {
            timeout_ms: timeout.as_millis() as u64,
        });
    }

    tokio::time::sleep(pairing).await;
    let device = ArmbandSimulator::new(config)?;
    info!("connected to armband");
    Ok(device)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(pattern: SignalPattern) -> SimulatorConfig {
        SimulatorConfig {
            pattern,
            seed: Some(7),
            ..SimulatorConfig::default()
        }
    }

    fn channel_rms(samples: &[RawSample], channel: usize) -> f64 {
        (samples.iter().map(|s| (s[channel] as f64).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = ArmbandSimulator::new(seeded(SignalPattern::default())).unwrap();
        let mut b = ArmbandSimulator::new(seeded(SignalPattern::default())).unwrap();
        for _ in 0..200 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }

    #[test]
    fn test_rms_tracks_activation() {
        let mut config = seeded(SignalPattern::Constant { level: 0.5 });
        config.noise = NoiseConfig::silent();
        let mut sim = ArmbandSimulator::new(config).unwrap();

        let samples: Vec<RawSample> = (0..4000).map(|_| sim.next_sample()).collect();
        // envelope 50 counts on a gain-1.0 channel
        let rms = channel_rms(&samples, 0);
        assert!((rms - 50.0).abs() < 5.0, "rms was {}", rms);
    }

    #[test]
    fn test_disconnect_zeroes_readings() {
        let mut sim = ArmbandSimulator::new(seeded(SignalPattern::Constant { level: 0.8 })).unwrap();
        assert!(!(0..10).all(|_| sim.next_sample().is_zeroed()));

        sim.disconnect();
        assert_eq!(sim.connection(), ConnectionState::Disconnected);
        let before = sim.elapsed();
        assert!((0..10).all(|_| sim.next_sample().is_zeroed()));
        assert!(sim.elapsed() > before);

        sim.reconnect();
        assert!(!(0..10).all(|_| sim.next_sample().is_zeroed()));
    }

    #[test]
    fn test_elapsed_does_not_drift() {
        let mut sim = ArmbandSimulator::new(seeded(SignalPattern::default())).unwrap();
        sim.disconnect();

        // one day at 20 Hz
        for _ in 0..1_728_000 {
            sim.next_sample();
        }
        assert!((sim.elapsed() - 86_400.0).abs() < 1e-9, "elapsed {}", sim.elapsed());

        sim.next_sample();
        assert!((sim.elapsed() - 86_400.05).abs() < 1e-9);

        sim.reset_time();
        assert_eq!(sim.elapsed(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulatorConfig::default();
        config.sample_rate_hz = 0.0;
        assert!(ArmbandSimulator::new(config).is_err());

        let mut config = SimulatorConfig::default();
        config.amplitude = 500.0;
        assert!(ArmbandSimulator::new(config).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_device() {
        let config = SimulatorConfig { pairing_delay_ms: 100, ..seeded(SignalPattern::default()) };
        assert!(wait_for_device(config.clone(), Duration::from_secs(10)).await.is_ok());

        let slow = SimulatorConfig { pairing_delay_ms: 20_000, ..config };
        let err = wait_for_device(slow, Duration::from_secs(10)).await.err().unwrap();
        assert_eq!(err, FatigueError::DeviceNotFound { timeout_ms: 10_000 });
    }
}
