//! Fatigue-Processing: streaming EMG fatigue detection
//!
//! Raw samples are reduced to per-channel RMS windows, windows are
//! collected into a trend history, each full history is fitted with a
//! least-squares line per channel, and the decision stage compares the
//! resulting slope against the previous cycle's.

pub mod config;
pub mod rms;
pub mod history;
pub mod regression;
pub mod decision;
pub mod pipeline;

pub use config::{PipelineConfig, XAxisMode};
pub use rms::RmsWindower;
pub use history::TrendHistory;
pub use regression::{linear_fit, LinearFit, SlopeEstimator, SlopeResult};
pub use decision::{DecisionState, FatigueDecision};
pub use pipeline::{FatiguePipeline, PipelineStats};
