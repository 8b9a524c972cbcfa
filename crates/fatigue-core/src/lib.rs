//! Fatigue-Core: Foundation types for the EMG fatigue pipeline
//!
//! Fixed-width sample and RMS containers, the alert event, and the shared
//! error type. Everything here is plain data with no I/O.

pub mod sample;
pub mod alert;
pub mod error;

pub use sample::*;
pub use alert::*;
pub use error::{FatigueError, FatigueResult};
