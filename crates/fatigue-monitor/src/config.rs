//! Monitor configuration loaded from TOML

use crate::haptics::HapticConfig;
use fatigue_core::{config_error, FatigueError, FatigueResult};
use fatigue_processing::PipelineConfig;
use fatigue_simulation::StreamConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Logging options; `RUST_LOG` takes precedence over `level`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Include the module path in each line
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Full monitor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub pipeline: PipelineConfig,
    pub stream: StreamConfig,
    pub haptics: HapticConfig,
    pub logging: LoggingConfig,
    pub device: DeviceConfig,
}

/// Device discovery options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// How long to wait for the armband to pair
    pub search_timeout_ms: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            search_timeout_ms: 10_000,
        }
    }
}

impl MonitorConfig {
    /// Read and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> FatigueResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FatigueError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating
    pub fn from_toml(text: &str) -> FatigueResult<Self> {
        toml::from_str(text).map_err(|e| FatigueError::ConfigParse {
            reason: e.to_string(),
        })
    }

    /// Render as TOML, e.g. to write out a starter file
    pub fn to_toml(&self) -> FatigueResult<String> {
        toml::to_string_pretty(self).map_err(|e| FatigueError::ConfigParse {
            reason: e.to_string(),
        })
    }

    /// Validate every section
    pub fn validate(&self) -> FatigueResult<()> {
        self.pipeline.validate()?;
        self.stream.validate()?;
        self.haptics.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(config_error!("logging.level", "must not be empty"));
        }
        if self.device.search_timeout_ms == 0 {
            return Err(config_error!("device.search_timeout_ms", "must be positive"));
        }
        Ok(())
    }

    /// Keep the simulator's notion of time in step with the tick rate
    pub fn sync_sample_rate(&mut self) {
        self.stream.simulator.sample_rate_hz = self.stream.tick_rate_hz;
    }

    /// Get the device search timeout
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.device.search_timeout_ms)
    }
}
