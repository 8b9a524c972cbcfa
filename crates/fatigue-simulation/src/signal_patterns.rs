//! Muscle activation profiles driving the simulated armband

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Activation level (0.0 to 1.0) as a function of elapsed seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalPattern {
    /// Constant activation level
    Constant { level: f32 },
    /// Sinusoidal contraction/relaxation
    Sinusoidal {
        frequency: f32,
        amplitude: f32,
        baseline: f32,
    },
    /// Linear change from one level to another, then hold
    Ramp {
        start_level: f32,
        end_level: f32,
        duration: f32,
    },
    /// On/off work intervals
    Burst {
        on_duration: f32,
        off_duration: f32,
        amplitude: f32,
    },
    /// Exponentially decaying amplitude, the classic fatigue profile
    Fatigue {
        initial_amplitude: f32,
        decay_rate: f32,
    },
    /// Steady activation with physiological tremor
    Realistic {
        base_activation: f32,
        tremor_frequency: f32,
        tremor_amplitude: f32,
    },
}

impl SignalPattern {
    /// Activation at `time` seconds, clamped to 0.0..=1.0
    pub fn activation_at_time(&self, time: f64) -> f32 {
        let level = match *self {
            SignalPattern::Constant { level } => f64::from(level),

            SignalPattern::Sinusoidal { frequency, amplitude, baseline } => {
                f64::from(baseline) + f64::from(amplitude) * (2.0 * PI * f64::from(frequency) * time).sin()
            }

            SignalPattern::Ramp { start_level, end_level, duration } => {
                let (start_level, end_level, duration) =
                    (f64::from(start_level), f64::from(end_level), f64::from(duration));
                if time >= duration || duration <= 0.0 {
                    end_level
                } else {
                    start_level + (end_level - start_level) * (time / duration)
                }
            }

            SignalPattern::Burst { on_duration, off_duration, amplitude } => {
                let cycle_duration = f64::from(on_duration) + f64::from(off_duration);
                if cycle_duration <= 0.0 || time % cycle_duration < f64::from(on_duration) {
                    f64::from(amplitude)
                } else {
                    0.0
                }
            }

            SignalPattern::Fatigue { initial_amplitude, decay_rate } => {
                f64::from(initial_amplitude) * (-f64::from(decay_rate) * time).exp()
            }

            SignalPattern::Realistic { base_activation, tremor_frequency, tremor_amplitude } => {
                f64::from(base_activation)
                    + f64::from(tremor_amplitude) * (2.0 * PI * f64::from(tremor_frequency) * time).sin()
            }
        };

        level.clamp(0.0, 1.0) as f32
    }

    /// Short human-readable name
    pub fn description(&self) -> &'static str {
        match self {
            SignalPattern::Constant { .. } => "Constant activation",
            SignalPattern::Sinusoidal { .. } => "Sinusoidal contraction",
            SignalPattern::Ramp { .. } => "Gradual ramp",
            SignalPattern::Burst { .. } => "Burst pattern",
            SignalPattern::Fatigue { .. } => "Muscle fatigue",
            SignalPattern::Realistic { .. } => "Realistic with tremor",
        }
    }

    /// Named profiles for the monitor's `--pattern` shortcut
    pub fn presets() -> Vec<(&'static str, SignalPattern)> {
        vec![
            ("rest", SignalPattern::Constant { level: 0.1 }),
            ("steady", SignalPattern::Realistic {
                base_activation: 0.6, tremor_frequency: 8.0, tremor_amplitude: 0.05,
            }),
            ("reps", SignalPattern::Burst {
                on_duration: 2.0, off_duration: 1.0, amplitude: 0.8,
            }),
            ("warmup", SignalPattern::Ramp {
                start_level: 0.1, end_level: 0.7, duration: 60.0,
            }),
            // one time constant every ~3 minutes at the default 20 Hz cadence
            ("fatigue", SignalPattern::Fatigue {
                initial_amplitude: 0.95, decay_rate: 0.005,
            }),
        ]
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<SignalPattern> {
        Self::presets()
            .into_iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
            .map(|(_, pattern)| pattern)
    }
}

impl Default for SignalPattern {
    fn default() -> Self {
        SignalPattern::Realistic {
            base_activation: 0.6,
            tremor_frequency: 8.0,
            tremor_amplitude: 0.05,
        }
    }
}
