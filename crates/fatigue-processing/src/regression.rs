//! Least-squares trend fitting over a full RMS history

use crate::config::{PipelineConfig, XAxisMode};
use fatigue_core::{validate_channel, FatigueResult, RmsVector, CHANNEL_COUNT, HISTORY_LEN};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Ordinary least-squares fit `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Variance of the intercept estimate
    pub cov00: f64,
    /// Covariance of intercept and slope
    pub cov01: f64,
    /// Variance of the slope estimate
    pub cov11: f64,
    /// Residual sum of squares
    pub sumsq: f64,
    /// The x-series had no spread and the neutral slope was substituted
    pub degenerate: bool,
}

/// Fit a line through `(x[i], y[i])`
///
/// Uses the mean-centred form of the closed-form estimator. When the
/// spread of `x` (`max - min`) is at or below `epsilon * max(|mean x|, 1)`,
/// or the slope comes out non-finite, the fit is degenerate: slope is
/// exactly `0.0`, the intercept is the mean of `y` and the covariances are
/// zero. Identical x values are always degenerate, whatever `epsilon`.
pub fn linear_fit(x: &[f64], y: &[f64], epsilon: f64) -> LinearFit {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len().min(y.len());
    if n == 0 {
        return LinearFit { degenerate: true, ..LinearFit::default() };
    }
    let nf = n as f64;

    let mean_x = x[..n].iter().sum::<f64>() / nf;
    let mean_y = y[..n].iter().sum::<f64>() / nf;

    let mut dx2 = 0.0;
    let mut dxdy = 0.0;
    let mut dy2 = 0.0;
    for (&xi, &yi) in x[..n].iter().zip(&y[..n]) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        dx2 += dx * dx;
        dxdy += dx * dy;
        dy2 += dy * dy;
    }

    let (min_x, max_x) = x[..n]
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &xi| (lo.min(xi), hi.max(xi)));
    let scale = mean_x.abs().max(1.0);
    let var_x = dx2 / nf;
    let slope = dxdy / dx2;

    // decided on the raw x values; a rounded mean leaves var_x slightly
    // positive even when every x is equal
    if max_x - min_x <= epsilon * scale || !slope.is_finite() {
        return LinearFit {
            slope: 0.0,
            intercept: mean_y,
            cov00: 0.0,
            cov01: 0.0,
            cov11: 0.0,
            sumsq: dy2,
            degenerate: true,
        };
    }

    let intercept = mean_y - mean_x * slope;

    let sumsq: f64 = x[..n]
        .iter()
        .zip(&y[..n])
        .map(|(&xi, &yi)| {
            let residual = (yi - mean_y) - slope * (xi - mean_x);
            residual * residual
        })
        .sum();

    let s2 = if n > 2 { sumsq / (nf - 2.0) } else { 0.0 };

    LinearFit {
        slope,
        intercept,
        cov00: s2 * (1.0 / nf) * (1.0 + mean_x * mean_x / var_x),
        cov01: s2 * (-mean_x) / (nf * var_x),
        cov11: s2 / (nf * var_x),
        sumsq,
        degenerate: false,
    }
}

/// Per-channel fits for one regression cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeResult {
    /// Time-axis value the cycle was fitted at
    pub time_axis: f64,
    pub fits: [LinearFit; CHANNEL_COUNT],
}

impl SlopeResult {
    /// Slope for one channel
    pub fn slope(&self, channel: usize) -> FatigueResult<f64> {
        validate_channel(channel).map(|ch| self.fits[ch].slope)
    }

    /// Slopes for all channels
    pub fn slopes(&self) -> [f64; CHANNEL_COUNT] {
        let mut out = [0.0; CHANNEL_COUNT];
        for (slot, fit) in out.iter_mut().zip(&self.fits) {
            *slot = fit.slope;
        }
        out
    }
}

/// Fits each channel's RMS history against the synthetic time axis
///
/// Owns the time axis, which advances by `time_step` after every cycle.
#[derive(Debug, Clone)]
pub struct SlopeEstimator {
    x_axis: XAxisMode,
    time_step: f64,
    epsilon: f64,
    time_axis: f64,
}

impl SlopeEstimator {
    /// Create an estimator with the time axis at zero
    pub fn new(config: &PipelineConfig) -> Self {
        SlopeEstimator {
            x_axis: config.x_axis,
            time_step: config.time_step,
            epsilon: config.degenerate_epsilon,
            time_axis: 0.0,
        }
    }

    /// Current time-axis value
    pub fn time_axis(&self) -> f64 {
        self.time_axis
    }

    /// X-coordinates for a cycle fitted at `t`
    pub fn x_series(&self, t: f64) -> [f64; HISTORY_LEN] {
        let mut x = [t; HISTORY_LEN];
        if self.x_axis == XAxisMode::Spread {
            let spacing = self.time_step / HISTORY_LEN as f64;
            for (j, xj) in x.iter_mut().enumerate() {
                *xj = t + j as f64 * spacing;
            }
        }
        x
    }

    /// Full fit of one channel's history at time `t`
    pub fn fit_channel(&self, history: &[RmsVector; HISTORY_LEN], channel: usize, t: f64) -> LinearFit {
        debug_assert!(channel < CHANNEL_COUNT, "channel {} out of range", channel);

        let x = self.x_series(t);
        let mut y = [0.0; HISTORY_LEN];
        for (yj, entry) in y.iter_mut().zip(history) {
            *yj = entry[channel];
        }

        linear_fit(&x, &y, self.epsilon)
    }

    /// Slope of one channel's history at time `t`
    pub fn fit(&self, history: &[RmsVector; HISTORY_LEN], channel: usize, t: f64) -> f64 {
        self.fit_channel(history, channel, t).slope
    }

    /// Checked variant of [`fit`](Self::fit)
    pub fn try_fit(&self, history: &[RmsVector; HISTORY_LEN], channel: usize, t: f64) -> FatigueResult<f64> {
        validate_channel(channel)?;
        Ok(self.fit(history, channel, t))
    }

    /// Fit every channel at the current time axis, then advance the axis
    pub fn fit_cycle(&mut self, history: &[RmsVector; HISTORY_LEN]) -> SlopeResult {
        let t = self.time_axis;
        let mut fits = [LinearFit::default(); CHANNEL_COUNT];
        for (channel, fit) in fits.iter_mut().enumerate() {
            *fit = self.fit_channel(history, channel, t);
            trace!(channel, slope = fit.slope, degenerate = fit.degenerate, "channel fit");
        }

        self.time_axis += self.time_step;

        SlopeResult { time_axis: t, fits }
    }

    /// Return the time axis to zero
    pub fn reset(&mut self) {
        self.time_axis = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_history(start: f64, per_window: f64) -> [RmsVector; HISTORY_LEN] {
        let mut history = [RmsVector::default(); HISTORY_LEN];
        for (j, entry) in history.iter_mut().enumerate() {
            *entry = RmsVector([start + per_window * j as f64; CHANNEL_COUNT]);
        }
        history
    }

    #[test]
    fn test_linear_fit_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 3.0, 5.0, 7.0, 9.0];
        let fit = linear_fit(&x, &y, 1e-12);

        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(fit.sumsq.abs() < 1e-20);
        assert!(!fit.degenerate);
    }

    #[test]
    fn test_linear_fit_matches_closed_form() {
        let x = [0.3, 1.1, 2.9, 3.2, 4.7, 5.0];
        let y = [2.0, 1.5, 0.7, 0.9, -0.4, -0.2];
        let n = x.len() as f64;
        let sx: f64 = x.iter().sum();
        let sy: f64 = y.iter().sum();
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| a * b).sum();
        let sxx: f64 = x.iter().map(|a| a * a).sum();
        let expected = (n * sxy - sx * sy) / (n * sxx - sx * sx);

        let fit = linear_fit(&x, &y, 1e-12);
        assert!((fit.slope - expected).abs() < 1e-9);
        assert!(fit.cov11 > 0.0);
    }

    #[test]
    fn test_shared_axis_is_degenerate_and_deterministic() {
        let estimator = SlopeEstimator::new(&PipelineConfig::shared_axis());
        let history = linear_history(20.0, -1.0);

        let first = estimator.fit_channel(&history, 0, 0.3);
        assert!(first.degenerate);
        assert_eq!(first.slope, 0.0);
        assert!((first.intercept - 10.5).abs() < 1e-12);

        for _ in 0..100 {
            let again = estimator.fit_channel(&history, 0, 0.3);
            assert_eq!(again.slope.to_bits(), first.slope.to_bits());
            assert_eq!(again.intercept.to_bits(), first.intercept.to_bits());
        }
    }

    #[test]
    fn test_identical_x_is_degenerate_without_epsilon() {
        let y: Vec<f64> = (0..HISTORY_LEN).map(|j| 3.0 - 0.37 * j as f64).collect();
        for t in [0.1, 0.1 + 0.2, 1.3, 17.9] {
            let fit = linear_fit(&[t; HISTORY_LEN], &y, 0.0);
            assert!(fit.degenerate, "t = {}", t);
            assert_eq!(fit.slope.to_bits(), 0.0f64.to_bits());
            assert_eq!(fit.cov11, 0.0);
        }
    }

    #[test]
    fn test_spread_axis_survives_large_time_axis() {
        let estimator = SlopeEstimator::new(&PipelineConfig::default());
        let history = linear_history(20.0, -1.0);
        let fit = estimator.fit_channel(&history, 0, 5000.0);
        assert!(!fit.degenerate);
        assert!((fit.slope - (-200.0)).abs() < 1e-3);
    }

    #[test]
    fn test_spread_axis_slope() {
        let estimator = SlopeEstimator::new(&PipelineConfig::default());
        let history = linear_history(20.0, -1.0);

        // one window per 0.1 / 20 time units
        let slope = estimator.fit(&history, 0, 0.0);
        assert!((slope - (-200.0)).abs() < 1e-6);

        // the offset of the cycle does not change the slope
        let later = estimator.fit(&history, 0, 4.2);
        assert!((later - slope).abs() < 1e-6);
    }

    #[test]
    fn test_flat_history_has_zero_slope() {
        let estimator = SlopeEstimator::new(&PipelineConfig::default());
        let history = linear_history(7.0, 0.0);
        let fit = estimator.fit_channel(&history, 3, 0.0);
        assert!(!fit.degenerate);
        assert!(fit.slope.abs() < 1e-9);
    }

    #[test]
    fn test_fit_cycle_advances_time_axis() {
        let mut estimator = SlopeEstimator::new(&PipelineConfig::default());
        let history = linear_history(1.0, 0.5);

        let first = estimator.fit_cycle(&history);
        let second = estimator.fit_cycle(&history);

        assert_eq!(first.time_axis, 0.0);
        assert!((second.time_axis - 0.1).abs() < 1e-12);
        assert!((estimator.time_axis() - 0.2).abs() < 1e-12);
        assert!((first.slope(5).unwrap() - 100.0).abs() < 1e-6);
        assert_eq!(first.slopes().len(), CHANNEL_COUNT);

        estimator.reset();
        assert_eq!(estimator.time_axis(), 0.0);
    }

    #[test]
    fn test_try_fit_rejects_bad_channel() {
        let estimator = SlopeEstimator::new(&PipelineConfig::default());
        let history = linear_history(1.0, 1.0);
        assert!(estimator.try_fit(&history, CHANNEL_COUNT, 0.0).is_err());
        assert!(estimator.try_fit(&history, 0, 0.0).is_ok());
    }
}
