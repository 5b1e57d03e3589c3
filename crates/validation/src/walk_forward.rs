//! Walk-forward efficiency analysis.
//!
//! The series is cut into rolling windows, each a training segment
//! immediately followed by a test segment. Comparing in-sample against
//! out-of-sample Sharpe across windows measures how much of the measured
//! performance survives on unseen data and how consistently it does so.

use serde::{Deserialize, Serialize};
use signal_gate_core::{mean, sharpe_ratio, Result, ValidationError};
use tracing::debug;

use crate::series::{derive_forward_returns, strategy_returns};

/// Configuration for walk-forward analysis, in observations per segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Observations in each training segment.
    pub train_size: usize,
    /// Observations in each test segment; also the step between windows.
    pub test_size: usize,
    /// Minimum number of windows required for a valid analysis.
    pub min_windows: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_size: 63, // one quarter of daily bars
            test_size: 21,  // one month of daily bars
            min_windows: 1,
        }
    }
}

impl WalkForwardConfig {
    /// Creates a config with custom segment sizes.
    #[must_use]
    pub fn new(train_size: usize, test_size: usize) -> Self {
        Self {
            train_size: train_size.max(2),
            test_size: test_size.max(2),
            min_windows: 1,
        }
    }

    /// Sets the minimum window count.
    #[must_use]
    pub fn with_min_windows(mut self, min_windows: usize) -> Self {
        self.min_windows = min_windows.max(1);
        self
    }
}

/// Walk-forward statistics for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardStats {
    /// Mean out-of-sample Sharpe over mean in-sample Sharpe; 1.0 when the
    /// in-sample mean is zero (nothing to degrade).
    pub efficiency: f64,
    /// Fraction of windows where the out-of-sample Sharpe direction
    /// agreed with the in-sample direction.
    pub consistency: f64,
    /// `1 - efficiency`, always exactly.
    pub degradation: f64,
    /// Number of windows analyzed.
    pub n_periods: usize,
    /// Mean in-sample Sharpe across windows.
    pub mean_in_sample_sharpe: f64,
    /// Mean out-of-sample Sharpe across windows.
    pub mean_out_of_sample_sharpe: f64,
}

/// Runs walk-forward analysis on a (signal, return) pair.
///
/// Windows are anchored every `test_size` observations: train on
/// `[start, start + train)`, test on `[start + train, start + train +
/// test)`. The strategy stream is `sign(signal) * forward_return` with
/// forward returns derived by a one-step shift.
///
/// # Errors
/// * `LengthMismatch` if the series lengths differ
/// * `InsufficientData` if fewer than `min_windows` windows fit
pub fn compute_walk_forward(
    returns: &[f64],
    signals: &[f64],
    config: &WalkForwardConfig,
) -> Result<WalkForwardStats> {
    if returns.len() != signals.len() {
        return Err(ValidationError::length_mismatch(returns.len(), signals.len()));
    }

    let window_len = config.train_size + config.test_size;
    let n = returns.len();
    if n < window_len {
        return Err(ValidationError::insufficient_data(window_len, n));
    }

    let forward = derive_forward_returns(returns);
    let stream = strategy_returns(signals, &forward);

    let mut is_sharpes = Vec::new();
    let mut oos_sharpes = Vec::new();
    let mut start = 0;
    while start + window_len <= n {
        let train = &stream[start..start + config.train_size];
        let test = &stream[start + config.train_size..start + window_len];
        is_sharpes.push(sharpe_ratio(train));
        oos_sharpes.push(sharpe_ratio(test));
        start += config.test_size;
    }

    let n_periods = is_sharpes.len();
    if n_periods < config.min_windows {
        return Err(ValidationError::insufficient_data(
            config.min_windows,
            n_periods,
        ));
    }

    let mean_is = mean(&is_sharpes);
    let mean_oos = mean(&oos_sharpes);

    let efficiency = if mean_is.abs() < f64::EPSILON {
        debug!("zero mean in-sample Sharpe, reporting neutral efficiency");
        1.0
    } else {
        mean_oos / mean_is
    };
    let degradation = 1.0 - efficiency;

    let agreeing = is_sharpes
        .iter()
        .zip(oos_sharpes.iter())
        .filter(|(is, oos)| direction(**is) == direction(**oos))
        .count();
    let consistency = agreeing as f64 / n_periods as f64;

    Ok(WalkForwardStats {
        efficiency,
        consistency,
        degradation,
        n_periods,
        mean_in_sample_sharpe: mean_is,
        mean_out_of_sample_sharpe: mean_oos,
    })
}

/// Sign bucket for consistency comparison; zero agrees only with zero.
fn direction(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
