//! Multi-gate statistical validation pipeline for trading-signal
//! indicators.
//!
//! A candidate indicator's backtest is only as trustworthy as its
//! validation: naive backtests overstate performance through overfitting
//! and multiple-testing bias. This crate judges a (signal, return) series
//! pair with five independent statistical tests: overfitting probability
//! (PBO via combinatorial cross-validation), deflated Sharpe significance,
//! information-coefficient strength, walk-forward efficiency, and
//! and orthogonality against already-adopted indicators. The outcomes fold
//! into one structured verdict.
//!
//! [`pipeline::run_validation_pipeline`] is the entry point external
//! callers use; the individual gates are exported for tooling that needs
//! them directly.

pub mod dsr;
pub mod ic;
pub mod orthogonality;
pub mod pbo;
pub mod pipeline;
pub mod series;
pub mod walk_forward;

pub use dsr::{compute_dsr, DsrResult};
pub use ic::{compute_ic, IcConfig, IcStats};
pub use orthogonality::{
    compute_vif, max_pairwise_correlation, orthogonalize, orthogonalize_multiple, VifConfig,
    VifResult,
};
pub use pbo::{
    compute_pbo, evaluate_pbo, minimum_backtest_length, rank_strategies_by_pbo, NamedStrategy,
    PboAssessment, PboConfig, PboInterpretation, PboRecommendation, PboResult, SplitCombination,
};
pub use pipeline::{
    run_validation_pipeline, DsrGate, IcGate, OrthogonalityGate, PboGate, TrialAdjustment,
    ValidationRequest, ValidationResult, WalkForwardGate, TOTAL_GATES,
};
pub use series::{derive_forward_returns, resolve_forward_returns, strategy_returns};
pub use walk_forward::{compute_walk_forward, WalkForwardConfig, WalkForwardStats};
