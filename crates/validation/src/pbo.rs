//! Probability of Backtest Overfitting via Combinatorial Symmetric
//! Cross-Validation (CSCV).
//!
//! The series is cut into contiguous blocks, every balanced train/test
//! assignment of those blocks is enumerated, and the candidate's in-sample
//! versus out-of-sample Sharpe behavior across all combinations estimates
//! how likely the observed backtest performance is an artifact of
//! overfitting.
//!
//! # CSCV Process
//!
//! 1. Partition the series into `n_splits` contiguous, equal-length blocks
//! 2. Enumerate all C(n_splits, n_splits/2) ways to pick train blocks
//! 3. Score in-sample and out-of-sample Sharpe for each combination
//! 4. Flag combinations whose out-of-sample rank falls below the median
//!    in-sample rank (logit-rank criterion)
//! 5. PBO = flagged combinations / total combinations

use serde::{Deserialize, Serialize};
use signal_gate_core::{mean, sharpe_ratio, Result, ValidationError, MIN_BACKTEST_LENGTH_FLOOR};
use tracing::warn;

use crate::series::{derive_forward_returns, strategy_returns};

/// Euler-Mascheroni constant, used in the expected-maximum approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Configuration for the CSCV analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PboConfig {
    /// Number of contiguous blocks; must be a positive even number.
    pub n_splits: usize,
    /// PBO at or above this value fails the gate.
    pub acceptable_threshold: f64,
    /// Minimum observations each block must contain.
    pub min_observations_per_block: usize,
    /// If true, per-combination detail is retained on the result.
    pub keep_combinations: bool,
}

impl Default for PboConfig {
    fn default() -> Self {
        Self {
            n_splits: 8,
            acceptable_threshold: 0.5,
            min_observations_per_block: 10,
            keep_combinations: false,
        }
    }
}

impl PboConfig {
    /// Creates a config with a custom split count.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            ..Self::default()
        }
    }

    /// Sets the acceptance threshold.
    #[must_use]
    pub fn with_threshold(mut self, acceptable_threshold: f64) -> Self {
        self.acceptable_threshold = acceptable_threshold;
        self
    }

    /// Retains per-combination detail on the result.
    #[must_use]
    pub fn with_combinations(mut self) -> Self {
        self.keep_combinations = true;
        self
    }
}

/// One balanced train/test assignment of the blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitCombination {
    /// Block indices assigned to the training partition.
    pub train_blocks: Vec<usize>,
    /// Block indices assigned to the test partition.
    pub test_blocks: Vec<usize>,
    /// Sharpe ratio of the strategy stream over the train blocks.
    pub in_sample_sharpe: f64,
    /// Sharpe ratio of the strategy stream over the test blocks.
    pub out_of_sample_sharpe: f64,
    /// True when the out-of-sample rank fell below the median in-sample
    /// rank.
    pub underperformed: bool,
}

/// Risk classification of a PBO estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PboInterpretation {
    /// PBO below 0.30.
    LowRisk,
    /// PBO in [0.30, 0.50).
    ModerateRisk,
    /// PBO at or above 0.50.
    HighRisk,
}

impl PboInterpretation {
    /// Classifies a PBO value into a risk band.
    #[must_use]
    pub fn from_pbo(pbo: f64) -> Self {
        if pbo < 0.30 {
            Self::LowRisk
        } else if pbo < 0.50 {
            Self::ModerateRisk
        } else {
            Self::HighRisk
        }
    }

    /// Human-readable risk phrase.
    #[must_use]
    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::LowRisk => "low risk of overfitting",
            Self::ModerateRisk => "moderate risk of overfitting",
            Self::HighRisk => "high risk of overfitting",
        }
    }
}

/// Result of a CSCV analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PboResult {
    /// Probability of backtest overfitting, in [0, 1].
    pub pbo: f64,
    /// Number of combinations enumerated: C(n_splits, n_splits/2).
    pub n_combinations: usize,
    /// Number of combinations flagged as underperformed.
    pub n_underperformed: usize,
    /// Mean in-sample Sharpe across combinations.
    pub mean_in_sample_sharpe: f64,
    /// Mean out-of-sample Sharpe across combinations.
    pub mean_out_of_sample_sharpe: f64,
    /// `1 - meanOOS/meanIS`, or 0 when the in-sample mean is 0.
    pub degradation: f64,
    /// Risk classification of the PBO value.
    pub interpretation: PboInterpretation,
    /// True when PBO is below the acceptance threshold.
    pub passed: bool,
    /// Per-combination detail, kept only on request.
    pub combinations: Option<Vec<SplitCombination>>,
}

/// A named candidate for comparative ranking.
#[derive(Debug, Clone)]
pub struct NamedStrategy {
    /// Strategy identifier, used in the ranking output.
    pub name: String,
    /// Signal values, aligned with `returns`.
    pub signals: Vec<f64>,
    /// Realized returns, aligned with `signals`.
    pub returns: Vec<f64>,
}

/// Recommendation derived from a PBO risk band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PboRecommendation {
    /// Low risk: accept the candidate.
    Accept,
    /// Moderate risk: review before adoption.
    Review,
    /// High risk: reject the candidate.
    Reject,
}

/// Human-readable assessment of a PBO result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PboAssessment {
    /// Accept / review / reject.
    pub recommendation: PboRecommendation,
    /// One-line summary containing the risk phrase.
    pub summary: String,
    /// Detail lines: PBO value, combinations tested, Sharpe means,
    /// degradation.
    pub details: Vec<String>,
}

/// Cuts `n` observations into `n_splits` contiguous blocks; the remainder
/// folds into the final block.
fn partition_blocks(n: usize, n_splits: usize) -> Vec<(usize, usize)> {
    let block_len = n / n_splits;
    (0..n_splits)
        .map(|b| {
            let start = b * block_len;
            let end = if b == n_splits - 1 { n } else { start + block_len };
            (start, end)
        })
        .collect()
}

/// Enumerates all ways to choose `k` block indices out of `n`.
fn enumerate_choices(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut all = Vec::new();
    let mut current = Vec::with_capacity(k);
    fn recurse(start: usize, n: usize, k: usize, current: &mut Vec<usize>, all: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            all.push(current.clone());
            return;
        }
        // Not enough indices left to fill the choice.
        let needed = k - current.len();
        for i in start..=n - needed {
            current.push(i);
            recurse(i + 1, n, k, current, all);
            current.pop();
        }
    }
    if k <= n {
        recurse(0, n, k, &mut current, &mut all);
    }
    all
}

/// Concatenates the strategy stream over the given blocks.
fn collect_block_returns(stream: &[f64], blocks: &[(usize, usize)], chosen: &[usize]) -> Vec<f64> {
    let mut collected = Vec::new();
    for &b in chosen {
        let (start, end) = blocks[b];
        collected.extend_from_slice(&stream[start..end]);
    }
    collected
}

/// Relative rank of `value` within `pool` by midrank, normalized to (0, 1).
fn relative_rank(value: f64, pool: &[f64]) -> f64 {
    let below = pool.iter().filter(|&&v| v < value).count() as f64;
    let equal = pool.iter().filter(|&&v| (v - value).abs() < f64::EPSILON).count() as f64;
    let rank = below + 0.5 * equal;
    ((rank + 0.5) / (pool.len() as f64 + 1.0)).clamp(1e-9, 1.0 - 1e-9)
}

/// Estimates the Probability of Backtest Overfitting for one candidate.
///
/// The strategy return stream is `sign(signal) * forward_return`, with
/// forward returns derived from `returns` by a one-step shift. Every
/// balanced assignment of the contiguous blocks is scored in-sample and
/// out-of-sample; a combination underperforms when the logit of its
/// out-of-sample rank within the pooled in-sample Sharpe distribution is
/// at or below zero, i.e. the out-of-sample Sharpe sits at or below the
/// median in-sample rank.
///
/// # Errors
/// * `LengthMismatch` if `returns` and `signals` differ in length
/// * `InvalidSplitCount` if `n_splits` is zero or odd
/// * `InsufficientData` if the series cannot fill every block with at
///   least `min_observations_per_block` observations
pub fn compute_pbo(returns: &[f64], signals: &[f64], config: &PboConfig) -> Result<PboResult> {
    if returns.len() != signals.len() {
        return Err(ValidationError::length_mismatch(returns.len(), signals.len()));
    }
    if config.n_splits == 0 || config.n_splits % 2 != 0 {
        return Err(ValidationError::InvalidSplitCount {
            n_splits: config.n_splits,
        });
    }
    let required = config.n_splits * config.min_observations_per_block;
    if returns.len() < required {
        return Err(ValidationError::insufficient_data(required, returns.len()));
    }

    let forward = derive_forward_returns(returns);
    let stream = strategy_returns(signals, &forward);

    let blocks = partition_blocks(stream.len(), config.n_splits);
    let choices = enumerate_choices(config.n_splits, config.n_splits / 2);
    let n_combinations = choices.len();

    // Score every combination.
    let mut scored: Vec<(Vec<usize>, Vec<usize>, f64, f64)> = Vec::with_capacity(n_combinations);
    for train in choices {
        let test: Vec<usize> = (0..config.n_splits).filter(|b| !train.contains(b)).collect();
        let is_sharpe = sharpe_ratio(&collect_block_returns(&stream, &blocks, &train));
        let oos_sharpe = sharpe_ratio(&collect_block_returns(&stream, &blocks, &test));
        scored.push((train, test, is_sharpe, oos_sharpe));
    }

    let is_pool: Vec<f64> = scored.iter().map(|(_, _, is, _)| *is).collect();

    let mut combinations = Vec::with_capacity(n_combinations);
    let mut n_underperformed = 0;
    for (train, test, is_sharpe, oos_sharpe) in scored {
        let omega = relative_rank(oos_sharpe, &is_pool);
        let logit = (omega / (1.0 - omega)).ln();
        let underperformed = logit <= 0.0;
        if underperformed {
            n_underperformed += 1;
        }
        combinations.push(SplitCombination {
            train_blocks: train,
            test_blocks: test,
            in_sample_sharpe: is_sharpe,
            out_of_sample_sharpe: oos_sharpe,
            underperformed,
        });
    }

    let pbo = (n_underperformed as f64 / n_combinations as f64).clamp(0.0, 1.0);
    let mean_is = mean(&is_pool);
    let mean_oos = mean(
        &combinations
            .iter()
            .map(|c| c.out_of_sample_sharpe)
            .collect::<Vec<f64>>(),
    );
    let degradation = if mean_is.abs() < f64::EPSILON {
        0.0
    } else {
        1.0 - mean_oos / mean_is
    };

    Ok(PboResult {
        pbo,
        n_combinations,
        n_underperformed,
        mean_in_sample_sharpe: mean_is,
        mean_out_of_sample_sharpe: mean_oos,
        degradation,
        interpretation: PboInterpretation::from_pbo(pbo),
        passed: pbo < config.acceptable_threshold,
        combinations: config.keep_combinations.then_some(combinations),
    })
}

/// Recommended minimum backtest length for a search over `n_trials`
/// candidates targeting `target_sharpe`.
///
/// Uses the expected maximum of `n_trials` standard-normal draws: a wider
/// search inflates the best null Sharpe, so the sample must be long enough
/// for the target to stand clear of it. Never recommends fewer than 252
/// observations.
#[must_use]
pub fn minimum_backtest_length(n_trials: usize, target_sharpe: f64) -> usize {
    if n_trials <= 1 || target_sharpe <= 0.0 {
        return MIN_BACKTEST_LENGTH_FLOOR;
    }

    let expected_max = expected_max_normal(n_trials);
    let years = (expected_max / target_sharpe).powi(2);
    let observations = (years * 252.0).ceil() as usize;
    observations.max(MIN_BACKTEST_LENGTH_FLOOR)
}

/// Expected maximum of `n` independent standard-normal draws
/// (Bailey-Lopez de Prado approximation).
pub(crate) fn expected_max_normal(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n_f = n as f64;
    let q1 = signal_gate_core::inverse_normal_cdf(1.0 - 1.0 / n_f);
    let q2 = signal_gate_core::inverse_normal_cdf(1.0 - 1.0 / (n_f * std::f64::consts::E));
    (1.0 - EULER_GAMMA) * q1 + EULER_GAMMA * q2
}

/// Computes PBO for each named strategy and sorts ascending (lower PBO is
/// better). Strategies whose series cannot be analyzed are skipped with a
/// warning.
#[must_use]
pub fn rank_strategies_by_pbo(
    strategies: &[NamedStrategy],
    config: &PboConfig,
) -> Vec<(String, PboResult)> {
    let mut ranked: Vec<(String, PboResult)> = strategies
        .iter()
        .filter_map(|strategy| {
            match compute_pbo(&strategy.returns, &strategy.signals, config) {
                Ok(result) => Some((strategy.name.clone(), result)),
                Err(err) => {
                    warn!(strategy = %strategy.name, error = %err, "skipping strategy in PBO ranking");
                    None
                }
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.1.pbo
            .partial_cmp(&b.1.pbo)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

/// Maps a PBO result to an accept/review/reject recommendation with
/// supporting detail lines.
#[must_use]
pub fn evaluate_pbo(result: &PboResult) -> PboAssessment {
    let recommendation = match result.interpretation {
        PboInterpretation::LowRisk => PboRecommendation::Accept,
        PboInterpretation::ModerateRisk => PboRecommendation::Review,
        PboInterpretation::HighRisk => PboRecommendation::Reject,
    };

    let summary = format!(
        "PBO {:.3}: {} across {} combinations",
        result.pbo,
        result.interpretation.phrase(),
        result.n_combinations
    );

    let details = vec![
        format!("PBO: {:.4}", result.pbo),
        format!("Combinations tested: {}", result.n_combinations),
        format!("Underperformed: {}", result.n_underperformed),
        format!("Mean in-sample Sharpe: {:.4}", result.mean_in_sample_sharpe),
        format!(
            "Mean out-of-sample Sharpe: {:.4}",
            result.mean_out_of_sample_sharpe
        ),
        format!("Degradation: {:.4}", result.degradation),
    ];

    PboAssessment {
        recommendation,
        summary,
        details,
    }
}
