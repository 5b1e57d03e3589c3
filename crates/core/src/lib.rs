//! Numeric kernel and shared types for indicator validation.
//!
//! This crate holds the dependency-light foundations the validation gates
//! build on: a dense linear-algebra kernel (Gauss-Jordan inversion,
//! multivariate OLS), descriptive statistics and distribution helpers, the
//! immutable threshold configuration, and the typed precondition errors.

pub mod config;
pub mod error;
pub mod linalg;
pub mod stats;

pub use config::{ValidationThresholds, DEFAULT_N_SPLITS, MIN_BACKTEST_LENGTH_FLOOR};
pub use error::{ensure_equal_len, Result, ValidationError};
pub use linalg::{invert_matrix, linear_regression, RegressionResult};
pub use stats::{
    calculate_ranks, inverse_normal_cdf, kurtosis, mean, pearson_correlation, sharpe_ratio,
    skewness, spearman_correlation, standard_normal_cdf, std_dev,
};
