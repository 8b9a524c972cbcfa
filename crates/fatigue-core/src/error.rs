//! Error handling for the fatigue monitor
//!
//! The pipeline's per-tick path has no error surface. These errors cover
//! configuration, the simulated device link and the sample stream.

use thiserror::Error;

/// Result type alias for fatigue monitor operations
pub type FatigueResult<T> = Result<T, FatigueError>;

/// Error type shared by all crates in the workspace
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FatigueError {
    /// A configuration value is outside its valid range
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field
        field: &'static str,
        /// Description of the problem
        reason: String,
    },

    /// Channel index beyond the armband's channel count
    #[error("Channel {channel} out of range (device has {channel_count} channels)")]
    ChannelOutOfRange {
        /// Requested channel
        channel: usize,
        /// Number of channels available
        channel_count: usize,
    },

    /// No device paired within the allowed time
    #[error("Unable to find an armband within {timeout_ms}ms")]
    DeviceNotFound {
        /// Search timeout in milliseconds
        timeout_ms: u64,
    },

    /// A stream or actuation channel was closed by its peer
    #[error("Channel closed: {name}")]
    StreamClosed {
        /// Which channel closed
        name: &'static str,
    },

    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {reason}")]
    ConfigIo {
        /// File path
        path: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// Configuration file is not valid TOML for the expected schema
    #[error("Failed to parse configuration: {reason}")]
    ConfigParse {
        /// Parser error message
        reason: String,
    },
}

impl FatigueError {
    /// Shorthand for an [`FatigueError::InvalidConfig`]
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        FatigueError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($field:literal, $($arg:tt)+) => {
        $crate::error::FatigueError::InvalidConfig {
            field: $field,
            reason: format!($($arg)+),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = FatigueError::ChannelOutOfRange {
            channel: 9,
            channel_count: 8,
        };
        let display = format!("{}", error);
        assert!(display.contains("Channel 9"));
        assert!(display.contains("8 channels"));
    }

    #[test]
    fn test_config_error_macro() {
        let error = config_error!("pipeline.time_step", "must be positive, got {}", -0.1);
        assert_eq!(
            error,
            FatigueError::invalid_config("pipeline.time_step", "must be positive, got -0.1")
        );
        assert!(error.to_string().contains("pipeline.time_step"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<FatigueError>();
    }
}
