//! Redundancy analysis against the existing indicator set.
//!
//! A candidate that is a linear recombination of indicators already in
//! production adds risk without adding information. The gate measures the
//! joint variance-inflation factor of the candidate against the whole set
//! and the largest pairwise correlation against any single member, and
//! offers residualization as remediation instead of outright rejection.
//!
//! Insufficient evidence fails closed: too few jointly-finite observations
//! yields an infinite VIF, never an "orthogonal" verdict.

use serde::{Deserialize, Serialize};
use signal_gate_core::{linear_regression, pearson_correlation, RegressionResult};
use tracing::warn;

/// R² values this close to 1 are treated as perfect collinearity.
const PERFECT_FIT_EPSILON: f64 = 1e-10;

/// Configuration for the VIF analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VifConfig {
    /// VIF at or above this value is unacceptable.
    pub max_vif: f64,
    /// VIF at or above this value (but below `max_vif`) is a warning.
    pub vif_warning: f64,
    /// Minimum jointly-finite observations, regardless of indicator count.
    pub min_observations: usize,
}

impl Default for VifConfig {
    fn default() -> Self {
        Self {
            max_vif: 5.0,
            vif_warning: 2.5,
            min_observations: 20,
        }
    }
}

/// Result of a variance-inflation-factor analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VifResult {
    /// Variance inflation factor: `1/(1-R²)`, at least 1, or +∞ for
    /// perfect collinearity and for insufficient data.
    pub vif: f64,
    /// R² of the candidate regressed on all existing indicators, in [0,1].
    pub r_squared: f64,
    /// Jointly-finite observations used.
    pub n_observations: usize,
    /// Number of existing indicators regressed against.
    pub n_indicators: usize,
    /// True when the VIF is below the configured maximum.
    pub is_acceptable: bool,
    /// True in the warning band and whenever the gate fails closed.
    pub is_warning: bool,
}

/// Sorts indicator references by name so every report is deterministic.
fn sorted_by_name(existing: &[(String, Vec<f64>)]) -> Vec<(&str, &[f64])> {
    let mut sorted: Vec<(&str, &[f64])> = existing
        .iter()
        .map(|(name, values)| (name.as_str(), values.as_slice()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
}

/// Indices where the candidate and every existing indicator are finite.
fn jointly_finite_indices(new_values: &[f64], existing: &[(&str, &[f64])]) -> Vec<usize> {
    (0..new_values.len())
        .filter(|&i| {
            new_values[i].is_finite()
                && existing
                    .iter()
                    .all(|(_, values)| values.get(i).is_some_and(|v| v.is_finite()))
        })
        .collect()
}

/// Computes the variance inflation factor of a candidate against the
/// existing indicator set.
///
/// With no existing indicators the VIF is trivially 1. With fewer
/// jointly-finite observations than `existing_count + 10` (or the
/// configured minimum, whichever is larger) the gate fails closed at +∞;
/// a thin overlap must never read as orthogonality.
#[must_use]
pub fn compute_vif(
    new_values: &[f64],
    existing: &[(String, Vec<f64>)],
    config: &VifConfig,
) -> VifResult {
    let sorted = sorted_by_name(existing);
    let n_indicators = sorted.len();

    if n_indicators == 0 {
        return VifResult {
            vif: 1.0,
            r_squared: 0.0,
            n_observations: new_values.iter().filter(|v| v.is_finite()).count(),
            n_indicators: 0,
            is_acceptable: true,
            is_warning: false,
        };
    }

    let indices = jointly_finite_indices(new_values, &sorted);
    let required = (n_indicators + 10).max(config.min_observations);

    if indices.len() < required {
        warn!(
            n_observations = indices.len(),
            required, "insufficient joint observations for VIF, failing closed"
        );
        return VifResult {
            vif: f64::INFINITY,
            r_squared: 0.0,
            n_observations: indices.len(),
            n_indicators,
            is_acceptable: false,
            is_warning: true,
        };
    }

    let x: Vec<Vec<f64>> = indices
        .iter()
        .map(|&i| sorted.iter().map(|(_, values)| values[i]).collect())
        .collect();
    let y: Vec<f64> = indices.iter().map(|&i| new_values[i]).collect();

    let fit = linear_regression(&x, &y);
    let r_squared = fit.r_squared;

    let vif = if r_squared >= 1.0 - PERFECT_FIT_EPSILON {
        f64::INFINITY
    } else {
        (1.0 / (1.0 - r_squared)).max(1.0)
    };

    let is_acceptable = vif < config.max_vif;
    let is_warning = !is_acceptable || vif >= config.vif_warning;

    VifResult {
        vif,
        r_squared,
        n_observations: indices.len(),
        n_indicators,
        is_acceptable,
        is_warning,
    }
}

/// Finds the single largest absolute pairwise correlation between the
/// candidate and any one existing indicator.
///
/// Each pair is correlated over its own jointly-finite observations.
/// Returns `None` when the existing set is empty; ties resolve to the
/// lexicographically first name so reports are deterministic.
#[must_use]
pub fn max_pairwise_correlation(
    new_values: &[f64],
    existing: &[(String, Vec<f64>)],
) -> Option<(String, f64)> {
    let sorted = sorted_by_name(existing);

    let mut best: Option<(String, f64)> = None;
    for (name, values) in sorted {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (a, b) in new_values.iter().zip(values.iter()) {
            if a.is_finite() && b.is_finite() {
                xs.push(*a);
                ys.push(*b);
            }
        }
        let correlation = pearson_correlation(&xs, &ys).abs();
        let beats = best.as_ref().is_none_or(|(_, current)| correlation > *current);
        if beats {
            best = Some((name.to_string(), correlation));
        }
    }
    best
}

/// Pairs of indices where both series are finite.
fn pairwise_finite(new_values: &[f64], other: &[f64]) -> Vec<usize> {
    new_values
        .iter()
        .zip(other.iter())
        .enumerate()
        .filter(|(_, (a, b))| a.is_finite() && b.is_finite())
        .map(|(i, _)| i)
        .collect()
}

/// Removes one correlated indicator's influence from a candidate.
///
/// Regresses the candidate on the correlated series and returns the
/// residuals. Positions where either series is missing or non-finite keep
/// the original candidate value; if the regression is impossible
/// (constant regressor) the candidate comes back unchanged.
#[must_use]
pub fn orthogonalize(new_values: &[f64], correlated_values: &[f64]) -> Vec<f64> {
    let indices = pairwise_finite(new_values, correlated_values);

    let x: Vec<Vec<f64>> = indices.iter().map(|&i| vec![correlated_values[i]]).collect();
    let y: Vec<f64> = indices.iter().map(|&i| new_values[i]).collect();

    apply_residuals(new_values, &indices, &linear_regression(&x, &y))
}

/// Multivariate residualization against a whole indicator set.
///
/// Regresses the candidate on every existing indicator jointly and
/// replaces complete positions with residuals; positions lacking complete
/// data are left untouched.
#[must_use]
pub fn orthogonalize_multiple(
    new_values: &[f64],
    existing: &[(String, Vec<f64>)],
) -> Vec<f64> {
    if existing.is_empty() {
        return new_values.to_vec();
    }

    let sorted = sorted_by_name(existing);
    let indices = jointly_finite_indices(new_values, &sorted);

    let x: Vec<Vec<f64>> = indices
        .iter()
        .map(|&i| sorted.iter().map(|(_, values)| values[i]).collect())
        .collect();
    let y: Vec<f64> = indices.iter().map(|&i| new_values[i]).collect();

    apply_residuals(new_values, &indices, &linear_regression(&x, &y))
}

/// Writes regression residuals back onto their source positions.
fn apply_residuals(new_values: &[f64], indices: &[usize], fit: &RegressionResult) -> Vec<f64> {
    let mut output = new_values.to_vec();
    for (position, residual) in indices.iter().zip(fit.residuals.iter()) {
        output[*position] = *residual;
    }
    output
}
