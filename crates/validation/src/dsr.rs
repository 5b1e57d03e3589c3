//! Deflated Sharpe Ratio significance testing.
//!
//! A raw Sharpe ratio found by searching many candidates overstates its
//! own significance: the best of N null strategies already looks good.
//! The DSR deflates the observed Sharpe by the expected maximum of N
//! null-Sharpe estimates and tests what remains against a
//! skewness/kurtosis-aware standard error.

use serde::{Deserialize, Serialize};
use signal_gate_core::{
    kurtosis, sharpe_ratio, skewness, standard_normal_cdf, Result, ValidationError,
};
use tracing::debug;

use crate::pbo::expected_max_normal;
use crate::series::{derive_forward_returns, strategy_returns};

/// Minimum observations for a meaningful Sharpe significance test.
const MIN_OBSERVATIONS: usize = 10;

/// Result of the deflated-Sharpe significance test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsrResult {
    /// Probability of observing this Sharpe under the deflated null;
    /// smaller is stronger evidence of genuine skill.
    pub p_value: f64,
    /// Number of trials searched before this candidate was selected.
    pub n_trials: usize,
    /// Deflated Sharpe probability Φ(z): confidence that the true Sharpe
    /// exceeds the expected maximum of the null trials.
    pub deflated_sharpe: f64,
    /// Observed per-period Sharpe of the strategy stream.
    pub observed_sharpe: f64,
    /// Expected maximum null Sharpe across `n_trials`.
    pub expected_max_sharpe: f64,
    /// True when `p_value` is at or below the configured threshold.
    pub passed: bool,
    /// Set when a degenerate input forced the conservative fallback.
    pub reason: Option<String>,
}

impl DsrResult {
    /// Conservative fallback: no evidence of skill.
    fn degenerate(n_trials: usize, observed_sharpe: f64, reason: &str) -> Self {
        Self {
            p_value: 1.0,
            n_trials,
            deflated_sharpe: 0.0,
            observed_sharpe,
            expected_max_sharpe: 0.0,
            passed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Computes the deflated Sharpe ratio test for a (signal, return) pair.
///
/// The strategy stream is `sign(signal) * forward_return`. The null
/// benchmark is the expected maximum of `n_trials` Sharpe estimates drawn
/// from a zero-skill distribution with standard error `1/sqrt(n-1)`;
/// one trial means no deflation at all. Degenerate input (too short, zero
/// variance) never panics: it yields `p_value = 1.0` with a `reason`.
///
/// For fixed data, the p-value is non-decreasing in `n_trials`:
/// searching more candidates can only weaken the evidence.
///
/// # Errors
/// Returns `LengthMismatch` if the series lengths differ.
pub fn compute_dsr(
    returns: &[f64],
    signals: &[f64],
    n_trials: usize,
    threshold: f64,
) -> Result<DsrResult> {
    if returns.len() != signals.len() {
        return Err(ValidationError::length_mismatch(returns.len(), signals.len()));
    }
    let n_trials = n_trials.max(1);

    if returns.len() < MIN_OBSERVATIONS {
        debug!(
            n_observations = returns.len(),
            "series too short for DSR, failing conservatively"
        );
        return Ok(DsrResult::degenerate(
            n_trials,
            0.0,
            "insufficient observations for DSR",
        ));
    }

    let forward = derive_forward_returns(returns);
    let stream = strategy_returns(signals, &forward);

    let observed = sharpe_ratio(&stream);
    if signal_gate_core::std_dev(&stream) < f64::EPSILON {
        return Ok(DsrResult::degenerate(
            n_trials,
            observed,
            "zero-variance strategy returns",
        ));
    }

    let n = stream.len() as f64;
    let null_std = 1.0 / (n - 1.0).sqrt();
    let expected_max = null_std * expected_max_normal(n_trials);

    // Probabilistic Sharpe ratio statistic against the deflated benchmark,
    // with the Mertens higher-moment standard error.
    let skew = skewness(&stream);
    let kurt = kurtosis(&stream);
    let variance_term = 1.0 - skew * observed + (kurt - 1.0) / 4.0 * observed * observed;
    let denominator = variance_term.max(1e-10).sqrt();

    let z = (observed - expected_max) * (n - 1.0).sqrt() / denominator;
    let deflated_sharpe = standard_normal_cdf(z);
    let p_value = (1.0 - deflated_sharpe).clamp(0.0, 1.0);

    Ok(DsrResult {
        p_value,
        n_trials,
        deflated_sharpe,
        observed_sharpe: observed,
        expected_max_sharpe: expected_max,
        passed: p_value <= threshold,
        reason: None,
    })
}
