//! Validation orchestrator.
//!
//! Runs every gate against one candidate indicator and folds the outcomes
//! into a single structured verdict. Malformed input (mismatched series
//! lengths, an odd split count) is the only way to get an error out of the
//! pipeline; statistically degenerate input (short series, constant
//! signals, all-zero returns) always produces a complete result whose
//! failures are expressed through gate outcomes and recommendations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_gate_core::{ValidationError, ValidationThresholds};
use tracing::{debug, info};

use crate::dsr::compute_dsr;
use crate::ic::{compute_ic, IcConfig};
use crate::orthogonality::{compute_vif, max_pairwise_correlation, VifConfig};
use crate::pbo::{compute_pbo, evaluate_pbo, expected_max_normal, PboConfig};
use crate::walk_forward::{compute_walk_forward, WalkForwardConfig};

/// Number of gates every candidate is judged against.
pub const TOTAL_GATES: usize = 5;

/// One candidate indicator submitted for validation.
#[derive(Debug, Clone)]
pub struct ValidationRequest<'a> {
    /// Identifier of the candidate indicator.
    pub indicator_id: &'a str,
    /// Signal values, one per bar.
    pub signals: &'a [f64],
    /// Realized returns, aligned with `signals`.
    pub returns: &'a [f64],
    /// Realized forward returns; derived from `returns` when absent.
    pub forward_returns: Option<&'a [f64]>,
    /// Already-adopted indicators, as (name, aligned series) pairs.
    pub existing: &'a [(String, Vec<f64>)],
    /// Trials attempted by the search that produced this candidate.
    pub n_trials: usize,
}

impl<'a> ValidationRequest<'a> {
    /// Creates a request with no existing indicators and a single trial.
    #[must_use]
    pub fn new(indicator_id: &'a str, signals: &'a [f64], returns: &'a [f64]) -> Self {
        Self {
            indicator_id,
            signals,
            returns,
            forward_returns: None,
            existing: &[],
            n_trials: 1,
        }
    }

    /// Supplies realized forward returns.
    #[must_use]
    pub fn with_forward_returns(mut self, forward_returns: &'a [f64]) -> Self {
        self.forward_returns = Some(forward_returns);
        self
    }

    /// Supplies the existing indicator set.
    #[must_use]
    pub fn with_existing(mut self, existing: &'a [(String, Vec<f64>)]) -> Self {
        self.existing = existing;
        self
    }

    /// Records how many trials the search attempted.
    #[must_use]
    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials.max(1);
        self
    }
}

/// Deflated-Sharpe gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsrGate {
    /// Deflated p-value of the observed Sharpe.
    pub p_value: f64,
    /// Trials the deflation accounted for.
    pub n_trials: usize,
    /// Whether the p-value met the threshold.
    pub passed: bool,
    /// Degenerate-input explanation, when applicable.
    pub reason: Option<String>,
}

/// Overfitting-probability gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PboGate {
    /// Probability of backtest overfitting, in [0, 1].
    pub value: f64,
    /// Split count used for the CSCV partition.
    pub n_splits: usize,
    /// Combinations enumerated; 0 when the gate failed closed.
    pub n_combinations: usize,
    /// Whether the PBO was below the acceptance threshold.
    pub passed: bool,
}

/// Information-coefficient gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcGate {
    /// Mean rolling IC.
    pub mean: f64,
    /// Standard deviation of the rolling IC.
    pub std: f64,
    /// IC information ratio.
    pub icir: f64,
    /// Sign-agreement rate between signal and forward return.
    pub hit_rate: f64,
    /// Observations analyzed.
    pub n_observations: usize,
    /// Whether mean and stability met the thresholds.
    pub passed: bool,
}

/// Walk-forward gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardGate {
    /// Out-of-sample to in-sample Sharpe ratio.
    pub efficiency: f64,
    /// Fraction of windows with agreeing Sharpe direction.
    pub consistency: f64,
    /// `1 - efficiency`.
    pub degradation: f64,
    /// Windows analyzed; 0 when the gate failed closed.
    pub n_periods: usize,
    /// Whether efficiency met the threshold.
    pub passed: bool,
}

/// Orthogonality gate outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrthogonalityGate {
    /// Joint variance inflation factor (may be +∞).
    pub vif: f64,
    /// Largest absolute pairwise correlation against one existing
    /// indicator.
    pub max_correlation: f64,
    /// Name of the most correlated existing indicator, when any exist.
    pub correlated_with: Option<String>,
    /// Size of the existing indicator set.
    pub n_existing_indicators: usize,
    /// Whether both the joint VIF and the pairwise limit were met.
    pub passed: bool,
}

/// Multiple-testing context recorded alongside the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialAdjustment {
    /// Trials attempted during the search.
    pub attempted: usize,
    /// Expected maximum null Sharpe for that many trials, i.e. the amount
    /// the observed Sharpe was deflated by.
    pub multiple_testing_penalty: f64,
}

/// Structured verdict for one candidate indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Identifier of the validated indicator.
    pub indicator_id: String,
    /// When the validation ran.
    pub timestamp: DateTime<Utc>,
    /// Deflated-Sharpe gate.
    pub dsr: DsrGate,
    /// Overfitting-probability gate.
    pub pbo: PboGate,
    /// Information-coefficient gate.
    pub ic: IcGate,
    /// Walk-forward gate.
    pub walk_forward: WalkForwardGate,
    /// Orthogonality gate.
    pub orthogonality: OrthogonalityGate,
    /// Multiple-testing context.
    pub trials: TrialAdjustment,
    /// True only when every gate passed (all-must-pass policy: a
    /// gatekeeper built to counter overfitting does not average away a
    /// failed overfitting test).
    pub overall_passed: bool,
    /// Number of gates that passed.
    pub gates_passed: usize,
    /// Always [`TOTAL_GATES`].
    pub total_gates: usize,
    /// `gates_passed / total_gates`, in [0, 1].
    pub pass_rate: f64,
    /// One-line human-readable verdict.
    pub summary: String,
    /// Actionable follow-ups; non-empty whenever any gate failed.
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    /// Renders the verdict as a human-readable report.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "=== Indicator Validation: {} ===\n\n",
            self.indicator_id
        ));
        output.push_str(&format!(
            "Gates passed: {}/{} ({:.0}%)\n",
            self.gates_passed,
            self.total_gates,
            self.pass_rate * 100.0
        ));
        output.push_str(&format!(
            "Overall: {}\n\n",
            if self.overall_passed { "PASSED" } else { "FAILED" }
        ));

        output.push_str("--- Deflated Sharpe ---\n");
        output.push_str(&format!("P-value: {:.4}\n", self.dsr.p_value));
        output.push_str(&format!("Trials: {}\n", self.dsr.n_trials));
        output.push_str(&format!("Passed: {}\n\n", self.dsr.passed));

        output.push_str("--- Overfitting (PBO) ---\n");
        output.push_str(&format!("PBO: {:.4}\n", self.pbo.value));
        output.push_str(&format!(
            "Combinations: {} over {} splits\n",
            self.pbo.n_combinations, self.pbo.n_splits
        ));
        output.push_str(&format!("Passed: {}\n\n", self.pbo.passed));

        output.push_str("--- Information Coefficient ---\n");
        output.push_str(&format!(
            "Mean: {:.4}  Std: {:.4}  ICIR: {:.4}\n",
            self.ic.mean, self.ic.std, self.ic.icir
        ));
        output.push_str(&format!("Hit rate: {:.1}%\n", self.ic.hit_rate * 100.0));
        output.push_str(&format!("Passed: {}\n\n", self.ic.passed));

        output.push_str("--- Walk-Forward ---\n");
        output.push_str(&format!(
            "Efficiency: {:.4}  Consistency: {:.4}  Degradation: {:.4}\n",
            self.walk_forward.efficiency,
            self.walk_forward.consistency,
            self.walk_forward.degradation
        ));
        output.push_str(&format!("Windows: {}\n", self.walk_forward.n_periods));
        output.push_str(&format!("Passed: {}\n\n", self.walk_forward.passed));

        output.push_str("--- Orthogonality ---\n");
        output.push_str(&format!(
            "VIF: {:.4}  Max pairwise correlation: {:.4}\n",
            self.orthogonality.vif, self.orthogonality.max_correlation
        ));
        if let Some(name) = &self.orthogonality.correlated_with {
            output.push_str(&format!("Most correlated with: {name}\n"));
        }
        output.push_str(&format!("Passed: {}\n\n", self.orthogonality.passed));

        output.push_str("=== RECOMMENDATIONS ===\n");
        if self.recommendations.is_empty() {
            output.push_str("None.\n");
        } else {
            for recommendation in &self.recommendations {
                output.push_str(&format!("- {recommendation}\n"));
            }
        }

        output
    }

    /// Serializes the verdict to pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the full multi-gate validation pipeline for one candidate.
///
/// # Errors
/// Returns `ValidationError::LengthMismatch` when `signals`, `returns`, or
/// a supplied forward-return series disagree in length, and
/// `InvalidSplitCount` when the configured CSCV split count is not a
/// positive even number. Nothing else errors: every statistically
/// degenerate input produces a complete result with failed gates.
pub fn run_validation_pipeline(
    request: &ValidationRequest<'_>,
    thresholds: &ValidationThresholds,
) -> Result<ValidationResult> {
    if request.signals.len() != request.returns.len() {
        return Err(
            ValidationError::length_mismatch(request.signals.len(), request.returns.len()).into(),
        );
    }
    if let Some(forward) = request.forward_returns {
        if forward.len() != request.signals.len() {
            return Err(
                ValidationError::length_mismatch(request.signals.len(), forward.len()).into(),
            );
        }
    }
    if thresholds.n_splits == 0 || thresholds.n_splits % 2 != 0 {
        return Err(ValidationError::InvalidSplitCount {
            n_splits: thresholds.n_splits,
        }
        .into());
    }

    let mut recommendations = Vec::new();

    // Information coefficient.
    let ic_stats = compute_ic(
        request.signals,
        request.returns,
        request.forward_returns,
        &IcConfig::default(),
    )?;
    let ic_passed = ic_stats.mean >= thresholds.ic_mean && ic_stats.std <= thresholds.ic_std;
    if !ic_passed {
        recommendations.push(format!(
            "Information coefficient too weak or unstable (mean {:.4}, std {:.4}); the signal \
             shows no reliable predictive power at this horizon",
            ic_stats.mean, ic_stats.std
        ));
    }
    let ic = IcGate {
        mean: ic_stats.mean,
        std: ic_stats.std,
        icir: ic_stats.icir,
        hit_rate: ic_stats.hit_rate,
        n_observations: ic_stats.n_observations,
        passed: ic_passed,
    };

    // Probability of backtest overfitting. Insufficient history fails
    // closed instead of erroring: missing evidence is not soundness.
    let pbo_config = PboConfig {
        n_splits: thresholds.n_splits,
        acceptable_threshold: thresholds.pbo,
        min_observations_per_block: thresholds.min_observations_per_block,
        keep_combinations: false,
    };
    let pbo = match compute_pbo(request.returns, request.signals, &pbo_config) {
        Ok(result) => {
            let assessment = evaluate_pbo(&result);
            if !result.passed {
                recommendations.push(assessment.summary.clone());
                recommendations.extend(assessment.details);
            }
            PboGate {
                value: result.pbo,
                n_splits: thresholds.n_splits,
                n_combinations: result.n_combinations,
                passed: result.passed,
            }
        }
        Err(ValidationError::InsufficientData { required, actual }) => {
            debug!(required, actual, "PBO gate failing closed on short history");
            recommendations.push(format!(
                "Series too short for overfitting analysis ({actual} observations, {required} \
                 required); extend the backtest before trusting this candidate"
            ));
            PboGate {
                value: 1.0,
                n_splits: thresholds.n_splits,
                n_combinations: 0,
                passed: false,
            }
        }
        Err(err) => return Err(err.into()),
    };

    // Walk-forward efficiency, same fail-closed treatment.
    let walk_forward = match compute_walk_forward(
        request.returns,
        request.signals,
        &WalkForwardConfig::default(),
    ) {
        Ok(stats) => {
            let passed = stats.efficiency >= thresholds.wf_efficiency;
            if !passed {
                recommendations.push(format!(
                    "Walk-forward efficiency {:.2} below {:.2}: out-of-sample performance decays \
                     too quickly",
                    stats.efficiency, thresholds.wf_efficiency
                ));
            }
            WalkForwardGate {
                efficiency: stats.efficiency,
                consistency: stats.consistency,
                degradation: stats.degradation,
                n_periods: stats.n_periods,
                passed,
            }
        }
        Err(ValidationError::InsufficientData { required, actual }) => {
            debug!(required, actual, "walk-forward gate failing closed on short history");
            recommendations.push(format!(
                "Series too short for walk-forward analysis ({actual} observations, {required} \
                 required)"
            ));
            WalkForwardGate {
                efficiency: 0.0,
                consistency: 0.0,
                degradation: 1.0,
                n_periods: 0,
                passed: false,
            }
        }
        Err(err) => return Err(err.into()),
    };

    // Deflated Sharpe significance.
    let dsr_result = compute_dsr(
        request.returns,
        request.signals,
        request.n_trials,
        thresholds.dsr_p_value,
    )?;
    if !dsr_result.passed {
        recommendations.push(match &dsr_result.reason {
            Some(reason) => format!("Deflated Sharpe test inconclusive: {reason}"),
            None => format!(
                "Deflated Sharpe p-value {:.4} above {:.4} after correcting for {} trials",
                dsr_result.p_value, thresholds.dsr_p_value, dsr_result.n_trials
            ),
        });
    }
    let dsr = DsrGate {
        p_value: dsr_result.p_value,
        n_trials: dsr_result.n_trials,
        passed: dsr_result.passed,
        reason: dsr_result.reason.clone(),
    };

    // Orthogonality against the adopted set. A high pairwise correlation
    // fails the gate even when the joint VIF is fine.
    let vif_config = VifConfig {
        max_vif: thresholds.max_vif,
        vif_warning: thresholds.vif_warning,
        min_observations: thresholds.min_vif_observations,
    };
    let vif_result = compute_vif(request.signals, request.existing, &vif_config);
    let pairwise = max_pairwise_correlation(request.signals, request.existing);
    let (correlated_with, max_correlation) = match pairwise {
        Some((name, correlation)) => (Some(name), correlation),
        None => (None, 0.0),
    };
    let orthogonality_passed =
        vif_result.is_acceptable && max_correlation <= thresholds.max_pairwise_correlation;
    if !orthogonality_passed {
        if let Some(name) = &correlated_with {
            if max_correlation > thresholds.max_pairwise_correlation {
                recommendations.push(format!(
                    "Highly correlated ({max_correlation:.2}) with existing indicator '{name}'; \
                     consider orthogonalizing against it instead of adopting as-is"
                ));
            }
        }
        if !vif_result.is_acceptable {
            recommendations.push(format!(
                "Variance inflation factor {} exceeds {:.1} against {} existing indicators",
                if vif_result.vif.is_finite() {
                    format!("{:.2}", vif_result.vif)
                } else {
                    "inf".to_string()
                },
                thresholds.max_vif,
                vif_result.n_indicators
            ));
        }
    }
    let orthogonality = OrthogonalityGate {
        vif: vif_result.vif,
        max_correlation,
        correlated_with,
        n_existing_indicators: request.existing.len(),
        passed: orthogonality_passed,
    };

    // Aggregate.
    let gates_passed = [
        dsr.passed,
        pbo.passed,
        ic.passed,
        walk_forward.passed,
        orthogonality.passed,
    ]
    .iter()
    .filter(|&&passed| passed)
    .count();
    let pass_rate = gates_passed as f64 / TOTAL_GATES as f64;
    let overall_passed = gates_passed == TOTAL_GATES;

    let summary = format!(
        "{}: {}/{} gates passed, {}",
        request.indicator_id,
        gates_passed,
        TOTAL_GATES,
        if overall_passed {
            "passed validation"
        } else {
            "failed validation"
        }
    );

    info!(
        indicator = request.indicator_id,
        gates_passed,
        overall_passed,
        "validation pipeline complete"
    );

    Ok(ValidationResult {
        indicator_id: request.indicator_id.to_string(),
        timestamp: Utc::now(),
        dsr,
        pbo,
        ic,
        walk_forward,
        orthogonality,
        trials: TrialAdjustment {
            attempted: request.n_trials.max(1),
            multiple_testing_penalty: expected_max_normal(request.n_trials.max(1)),
        },
        overall_passed,
        gates_passed,
        total_gates: TOTAL_GATES,
        pass_rate,
        summary,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Test Helpers
    // ============================================================

    /// Deterministic pseudo-noise series, bounded and zero-centered.
    fn noise_series(len: usize, seed: u64) -> Vec<f64> {
        let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 33) as f64 / (1u64 << 30) as f64 - 1.0) * 0.01
            })
            .collect()
    }

    fn long_pair() -> (Vec<f64>, Vec<f64>) {
        (noise_series(400, 3), noise_series(400, 5))
    }

    // ============================================================
    // Precondition Tests
    // ============================================================

    #[test]
    fn mismatched_lengths_error() {
        let request = ValidationRequest::new("candidate", &[1.0; 10], &[0.01; 9]);
        let result = run_validation_pipeline(&request, &ValidationThresholds::default());

        assert!(result.is_err());
    }

    #[test]
    fn mismatched_forward_returns_error() {
        let signals = vec![1.0; 100];
        let returns = vec![0.01; 100];
        let forward = vec![0.01; 90];
        let request =
            ValidationRequest::new("candidate", &signals, &returns).with_forward_returns(&forward);

        let result = run_validation_pipeline(&request, &ValidationThresholds::default());
        assert!(result.is_err());
    }

    #[test]
    fn odd_split_count_errors() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("candidate", &signals, &returns);
        let thresholds = ValidationThresholds::default().with_n_splits(5);

        assert!(run_validation_pipeline(&request, &thresholds).is_err());
    }

    // ============================================================
    // Degenerate Input Tests (must never error)
    // ============================================================

    #[test]
    fn short_series_returns_complete_result() {
        let signals = noise_series(50, 1);
        let returns = noise_series(50, 2);
        let request = ValidationRequest::new("short", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        // PBO and walk-forward fail closed rather than erroring.
        assert!(!result.pbo.passed);
        assert_eq!(result.pbo.n_combinations, 0);
        assert!((result.pbo.value - 1.0).abs() < f64::EPSILON);
        assert!(!result.walk_forward.passed);
        assert_eq!(result.walk_forward.n_periods, 0);
        assert!(!result.overall_passed);
        assert!(!result.recommendations.is_empty());
        assert!(result.pass_rate.is_finite());
    }

    #[test]
    fn constant_signal_returns_complete_result() {
        let returns = noise_series(400, 9);
        let signals = vec![1.0; 400];
        let request = ValidationRequest::new("constant", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!(result.ic.mean.abs() < f64::EPSILON);
        assert!(result.pbo.value.is_finite());
        assert!(result.walk_forward.efficiency.is_finite());
        assert!(result.dsr.p_value.is_finite());
    }

    #[test]
    fn all_zero_returns_yield_complete_result() {
        let returns = vec![0.0; 400];
        let signals = noise_series(400, 4);
        let request = ValidationRequest::new("flat_market", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!(result.dsr.reason.is_some());
        assert!((result.dsr.p_value - 1.0).abs() < f64::EPSILON);
        assert!(result.pass_rate >= 0.0 && result.pass_rate <= 1.0);
    }

    #[test]
    fn many_existing_indicators_never_panic() {
        let (returns, signals) = long_pair();
        let existing: Vec<(String, Vec<f64>)> = (0..25)
            .map(|i| (format!("existing_{i:02}"), noise_series(400, 100 + i)))
            .collect();
        let request =
            ValidationRequest::new("crowded", &signals, &returns).with_existing(&existing);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert_eq!(result.orthogonality.n_existing_indicators, 25);
    }

    // ============================================================
    // Aggregation Tests
    // ============================================================

    #[test]
    fn gate_count_matches_individual_outcomes() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("candidate", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        let expected = [
            result.dsr.passed,
            result.pbo.passed,
            result.ic.passed,
            result.walk_forward.passed,
            result.orthogonality.passed,
        ]
        .iter()
        .filter(|&&p| p)
        .count();

        assert_eq!(result.gates_passed, expected);
        assert_eq!(result.total_gates, 5);
        assert!((result.pass_rate - expected as f64 / 5.0).abs() < 1e-12);
        assert_eq!(result.overall_passed, expected == 5);
    }

    #[test]
    fn trials_context_is_recorded() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("searched", &signals, &returns).with_n_trials(50);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert_eq!(result.trials.attempted, 50);
        assert!(result.trials.multiple_testing_penalty > 0.0);
        assert_eq!(result.dsr.n_trials, 50);
    }

    #[test]
    fn summary_names_the_indicator() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("rsi_divergence_v3", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!(result.summary.contains("rsi_divergence_v3"));
        assert!(result.summary.contains("/5 gates passed"));
    }

    // ============================================================
    // Orthogonality Integration Tests
    // ============================================================

    #[test]
    fn manufactured_clone_is_flagged_and_named() {
        let (returns, base) = long_pair();
        let clone: Vec<f64> = base.iter().map(|v| v * 1.1 + 0.01).collect();
        let existing = vec![
            ("momentum_10d".to_string(), base),
            ("volume_spike".to_string(), noise_series(400, 77)),
        ];
        let request =
            ValidationRequest::new("disguised_momentum", &clone, &returns).with_existing(&existing);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!(result.orthogonality.max_correlation > 0.9);
        assert!(!result.orthogonality.passed);
        assert_eq!(
            result.orthogonality.correlated_with.as_deref(),
            Some("momentum_10d")
        );
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.contains("momentum_10d")));
    }

    #[test]
    fn independent_indicator_passes_orthogonality() {
        let (returns, signals) = long_pair();
        let existing = vec![
            ("alpha".to_string(), noise_series(400, 61)),
            ("beta".to_string(), noise_series(400, 62)),
        ];
        let request =
            ValidationRequest::new("fresh_idea", &signals, &returns).with_existing(&existing);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!(result.orthogonality.max_correlation < 0.7);
        assert!(result.orthogonality.passed);
    }

    #[test]
    fn no_existing_indicators_pass_trivially() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("first_ever", &signals, &returns);

        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        assert!((result.orthogonality.vif - 1.0).abs() < f64::EPSILON);
        assert!(result.orthogonality.correlated_with.is_none());
        assert!(result.orthogonality.passed);
    }

    // ============================================================
    // Rendering Tests
    // ============================================================

    #[test]
    fn to_text_includes_all_sections() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("render_me", &signals, &returns);
        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        let text = result.to_text();

        assert!(text.contains("Indicator Validation: render_me"));
        assert!(text.contains("Deflated Sharpe"));
        assert!(text.contains("Overfitting (PBO)"));
        assert!(text.contains("Information Coefficient"));
        assert!(text.contains("Walk-Forward"));
        assert!(text.contains("Orthogonality"));
        assert!(text.contains("RECOMMENDATIONS"));
    }

    #[test]
    fn to_json_parses_back() {
        let (returns, signals) = long_pair();
        let request = ValidationRequest::new("json_me", &signals, &returns);
        let result =
            run_validation_pipeline(&request, &ValidationThresholds::default()).unwrap();

        let json = result.to_json().unwrap();
        let parsed: ValidationResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.indicator_id, "json_me");
        assert_eq!(parsed.gates_passed, result.gates_passed);
    }
}
