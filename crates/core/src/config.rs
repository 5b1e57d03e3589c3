//! Threshold configuration for the validation pipeline.
//!
//! A single immutable value type carries every tunable limit. Callers pass
//! it (or a modified copy) into each run; nothing here is module-level
//! mutable state, so concurrent validations of different indicators never
//! interfere.

use serde::{Deserialize, Serialize};

/// Minimum recommended backtest length in observations, regardless of how
/// few trials were attempted.
pub const MIN_BACKTEST_LENGTH_FLOOR: usize = 252;

/// Default number of contiguous blocks for combinatorial cross-validation.
pub const DEFAULT_N_SPLITS: usize = 8;

/// Thresholds applied by the validation gates.
///
/// `Default` preserves the compatibility values downstream consumers rely
/// on: PBO acceptance below 0.5 with risk bands at 0.30/0.50, CSCV split
/// count 8, and a 252-observation backtest-length floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    /// Maximum DSR p-value for the deflated-Sharpe gate to pass.
    pub dsr_p_value: f64,
    /// PBO at or above this value fails the overfitting gate.
    pub pbo: f64,
    /// Minimum mean information coefficient.
    pub ic_mean: f64,
    /// Maximum standard deviation of the rolling information coefficient.
    pub ic_std: f64,
    /// Minimum walk-forward efficiency (out-of-sample / in-sample Sharpe).
    pub wf_efficiency: f64,
    /// VIF at or above this value fails the orthogonality gate.
    pub max_vif: f64,
    /// VIF at or above this value (but below `max_vif`) is flagged as a
    /// warning.
    pub vif_warning: f64,
    /// Maximum absolute pairwise correlation against any single existing
    /// indicator.
    pub max_pairwise_correlation: f64,
    /// Minimum jointly-finite observations for a trustworthy VIF.
    pub min_vif_observations: usize,
    /// Number of contiguous blocks for the CSCV partition (must be even).
    pub n_splits: usize,
    /// Minimum observations each CSCV block must contain.
    pub min_observations_per_block: usize,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            dsr_p_value: 0.05,
            pbo: 0.5,
            ic_mean: 0.01,
            ic_std: 1.0,
            wf_efficiency: 0.5,
            max_vif: 5.0,
            vif_warning: 2.5,
            max_pairwise_correlation: 0.7,
            min_vif_observations: 20,
            n_splits: DEFAULT_N_SPLITS,
            min_observations_per_block: 10,
        }
    }
}

impl ValidationThresholds {
    /// Sets the DSR p-value limit.
    #[must_use]
    pub fn with_dsr_p_value(mut self, dsr_p_value: f64) -> Self {
        self.dsr_p_value = dsr_p_value;
        self
    }

    /// Sets the PBO acceptance threshold.
    #[must_use]
    pub fn with_pbo(mut self, pbo: f64) -> Self {
        self.pbo = pbo;
        self
    }

    /// Sets the minimum mean information coefficient.
    #[must_use]
    pub fn with_ic_mean(mut self, ic_mean: f64) -> Self {
        self.ic_mean = ic_mean;
        self
    }

    /// Sets the minimum walk-forward efficiency.
    #[must_use]
    pub fn with_wf_efficiency(mut self, wf_efficiency: f64) -> Self {
        self.wf_efficiency = wf_efficiency;
        self
    }

    /// Sets the VIF limits (warning band and hard maximum).
    #[must_use]
    pub fn with_vif_limits(mut self, vif_warning: f64, max_vif: f64) -> Self {
        self.vif_warning = vif_warning;
        self.max_vif = max_vif;
        self
    }

    /// Sets the maximum pairwise correlation limit.
    #[must_use]
    pub fn with_max_pairwise_correlation(mut self, limit: f64) -> Self {
        self.max_pairwise_correlation = limit;
        self
    }

    /// Sets the CSCV split count.
    #[must_use]
    pub fn with_n_splits(mut self, n_splits: usize) -> Self {
        self.n_splits = n_splits;
        self
    }
}
