//! Fatigue-Simulation: simulated armband for driving the fatigue pipeline
//!
//! Provides the ingest side of the monitor: activation patterns, an
//! 8-channel sample generator with a connect/disconnect lifecycle, and a
//! fixed-cadence stream that delivers samples in order.

pub mod real_time_stream;
pub mod signal_patterns;
pub mod armband;

pub use armband::*;
pub use real_time_stream::*;
pub use signal_patterns::*;
