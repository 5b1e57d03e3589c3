//! Descriptive statistics and distribution helpers shared by the gates.
//!
//! Everything here is a total function on `f64` slices: degenerate input
//! (empty, too short, zero variance) returns a defined neutral value
//! instead of NaN or an error, so gate code never has to branch on
//! numerical edge cases.

/// Arithmetic mean; 0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator); 0 when fewer than two
/// observations.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Per-period Sharpe ratio: mean over standard deviation of the return
/// stream. Zero-variance streams score 0 rather than dividing by zero.
///
/// No annualization is applied; every consumer compares in-sample against
/// out-of-sample values of the same convention, so a constant factor would
/// cancel anyway.
#[must_use]
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    let sd = std_dev(returns);
    if sd < f64::EPSILON {
        return 0.0;
    }
    mean(returns) / sd
}

/// Sample skewness; 0 when fewer than three observations or zero variance.
#[must_use]
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    let m = mean(values);
    let sd = std_dev(values);
    if sd < f64::EPSILON {
        return 0.0;
    }
    let n_f = n as f64;
    let m3 = values.iter().map(|v| ((v - m) / sd).powi(3)).sum::<f64>();
    m3 * n_f / ((n_f - 1.0) * (n_f - 2.0))
}

/// Sample kurtosis (not excess); 3 (the normal value) when fewer than four
/// observations or zero variance, so the DSR correction term vanishes for
/// degenerate input.
#[must_use]
pub fn kurtosis(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 4 {
        return 3.0;
    }
    let m = mean(values);
    let sd = std_dev(values);
    if sd < f64::EPSILON {
        return 3.0;
    }
    let n_f = n as f64;
    let m4 = values.iter().map(|v| ((v - m) / sd).powi(4)).sum::<f64>();
    let adjustment = 3.0 * (n_f - 1.0) * (n_f - 1.0) / ((n_f - 2.0) * (n_f - 3.0));
    m4 * n_f * (n_f + 1.0) / ((n_f - 1.0) * (n_f - 2.0) * (n_f - 3.0)) + 3.0 - adjustment
}

/// Calculates the Pearson correlation coefficient between two series.
///
/// Returns 0 for mismatched lengths, fewer than two observations, or
/// zero variance in either series.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < f64::EPSILON {
        return 0.0;
    }

    covariance / denominator
}

/// Calculates ranks for a slice of values, handling ties with average rank.
///
/// # Arguments
/// * `values` - Slice of values to rank
///
/// # Returns
/// Vector of ranks (1-based, with ties averaged)
#[must_use]
pub fn calculate_ranks(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return vec![];
    }

    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().cloned().enumerate().collect();

    // Sort by value, keeping original indices
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];

    // Assign ranks, handling ties
    let mut i = 0;
    while i < n {
        // Find the extent of ties
        let mut j = i + 1;
        while j < n && (indexed[j].1 - indexed[i].1).abs() < f64::EPSILON {
            j += 1;
        }

        // Average rank for ties
        // Ranks are 1-based: positions i..j map to ranks (i+1)..(j+1)
        let avg_rank = (i + 1..j + 1).map(|r| r as f64).sum::<f64>() / (j - i) as f64;

        for k in i..j {
            ranks[indexed[k].0] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Calculates the Spearman rank correlation coefficient.
#[must_use]
pub fn spearman_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let ranks_x = calculate_ranks(x);
    let ranks_y = calculate_ranks(y);

    pearson_correlation(&ranks_x, &ranks_y)
}

/// Standard normal CDF approximation (Abramowitz-Stegun polynomial).
#[must_use]
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - standard_normal_cdf(-x);
    }

    let b1 = 0.319_381_530;
    let b2 = -0.356_563_782;
    let b3 = 1.781_477_937;
    let b4 = -1.821_255_978;
    let b5 = 1.330_274_429;
    let p = 0.231_641_9;

    let t = 1.0 / (1.0 + p * x);
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    let t5 = t4 * t;

    let pdf = (-x * x / 2.0).exp() / (2.0 * std::f64::consts::PI).sqrt();
    1.0 - pdf * (b1 * t + b2 * t2 + b3 * t3 + b4 * t4 + b5 * t5)
}

/// Inverse standard normal CDF (Acklam's rational approximation).
///
/// The argument is clamped to `[1e-12, 1 - 1e-12]`; callers that need the
/// tails should clamp their probabilities first rather than relying on
/// infinite quantiles.
#[must_use]
pub fn inverse_normal_cdf(p: f64) -> f64 {
    let p = p.clamp(1e-12, 1.0 - 1e-12);

    let a1 = -39.696_830_286_653_76;
    let a2 = 220.946_098_424_520_8;
    let a3 = -275.928_510_446_969_0;
    let a4 = 138.357_751_867_269_1;
    let a5 = -30.664_798_066_147_16;
    let a6 = 2.506_628_277_459_239;

    let b1 = -54.476_098_798_224_06;
    let b2 = 161.585_836_858_040_9;
    let b3 = -155.698_979_859_886_6;
    let b4 = 66.801_311_887_719_72;
    let b5 = -13.280_681_552_885_72;

    let c1 = -0.007_784_894_002_430_293;
    let c2 = -0.322_396_458_041_136_5;
    let c3 = -2.400_758_277_161_838;
    let c4 = -2.549_732_539_343_734;
    let c5 = 4.374_664_141_464_968;
    let c6 = 2.938_163_982_698_783;

    let d1 = 0.007_784_695_709_041_462;
    let d2 = 0.322_467_129_070_039_8;
    let d3 = 2.445_134_137_142_996;
    let d4 = 3.754_408_661_907_416;

    let p_low = 0.024_25;
    let p_high = 1.0 - p_low;

    if p < p_low {
        // Lower tail
        let q = (-2.0 * p.ln()).sqrt();
        (((((c1 * q + c2) * q + c3) * q + c4) * q + c5) * q + c6)
            / ((((d1 * q + d2) * q + d3) * q + d4) * q + 1.0)
    } else if p <= p_high {
        // Central region
        let q = p - 0.5;
        let r = q * q;
        (((((a1 * r + a2) * r + a3) * r + a4) * r + a5) * r + a6) * q
            / (((((b1 * r + b2) * r + b3) * r + b4) * r + b5) * r + 1.0)
    } else {
        // Upper tail
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((c1 * q + c2) * q + c3) * q + c4) * q + c5) * q + c6)
            / ((((d1 * q + d2) * q + d3) * q + d4) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    // ============================================================
    // Moment Tests
    // ============================================================

    #[test]
    fn mean_of_empty_is_zero() {
        assert_close(mean(&[]), 0.0, 1e-12);
    }

    #[test]
    fn mean_of_known_values() {
        assert_close(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5, 1e-12);
    }

    #[test]
    fn std_dev_of_single_value_is_zero() {
        assert_close(std_dev(&[42.0]), 0.0, 1e-12);
    }

    #[test]
    fn std_dev_of_known_values() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] is sqrt(32/7).
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(std_dev(&values), (32.0_f64 / 7.0).sqrt(), 1e-10);
    }

    #[test]
    fn sharpe_of_constant_stream_is_zero() {
        assert_close(sharpe_ratio(&[0.01; 50]), 0.0, 1e-12);
    }

    #[test]
    fn sharpe_positive_for_positive_drift() {
        let returns: Vec<f64> = (0..100)
            .map(|i| 0.01 + if i % 2 == 0 { 0.005 } else { -0.005 })
            .collect();
        assert!(sharpe_ratio(&returns) > 0.0);
    }

    #[test]
    fn skewness_of_symmetric_data_near_zero() {
        let values: Vec<f64> = (-50..=50).map(|i| i as f64).collect();
        assert_close(skewness(&values), 0.0, 1e-10);
    }

    #[test]
    fn skewness_short_series_is_zero() {
        assert_close(skewness(&[1.0, 2.0]), 0.0, 1e-12);
    }

    #[test]
    fn kurtosis_degenerate_is_normal() {
        assert_close(kurtosis(&[1.0, 2.0, 3.0]), 3.0, 1e-12);
        assert_close(kurtosis(&[5.0; 10]), 3.0, 1e-12);
    }

    // ============================================================
    // Correlation Tests
    // ============================================================

    #[test]
    fn pearson_perfect_positive() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        assert_close(pearson_correlation(&x, &y), 1.0, 1e-10);
    }

    #[test]
    fn pearson_perfect_negative() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| -v).collect();
        assert_close(pearson_correlation(&x, &y), -1.0, 1e-10);
    }

    #[test]
    fn pearson_constant_series_is_zero() {
        let x = [1.0; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_close(pearson_correlation(&x, &y), 0.0, 1e-12);
    }

    #[test]
    fn pearson_mismatched_lengths_is_zero() {
        assert_close(pearson_correlation(&[1.0, 2.0], &[1.0]), 0.0, 1e-12);
    }

    #[test]
    fn spearman_monotonic_nonlinear_is_one() {
        let x: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v.exp()).collect();
        assert_close(spearman_correlation(&x, &y), 1.0, 1e-10);
    }

    // ============================================================
    // Rank Tests
    // ============================================================

    #[test]
    fn ranks_calculated_correctly() {
        let values = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        let ranks = calculate_ranks(&values);

        // The two 1.0s share ranks 1 and 2, averaged to 1.5.
        assert_close(ranks[0], 3.0, 1e-12);
        assert_close(ranks[1], 1.5, 1e-12);
        assert_close(ranks[2], 4.0, 1e-12);
        assert_close(ranks[3], 1.5, 1e-12);
        assert_close(ranks[4], 5.0, 1e-12);
    }

    #[test]
    fn ranks_handles_triple_tie() {
        let values = vec![1.0, 1.0, 1.0, 4.0, 5.0];
        let ranks = calculate_ranks(&values);

        assert_close(ranks[0], 2.0, 1e-12);
        assert_close(ranks[1], 2.0, 1e-12);
        assert_close(ranks[2], 2.0, 1e-12);
        assert_close(ranks[3], 4.0, 1e-12);
        assert_close(ranks[4], 5.0, 1e-12);
    }

    #[test]
    fn ranks_empty_returns_empty() {
        assert!(calculate_ranks(&[]).is_empty());
    }

    // ============================================================
    // Distribution Tests
    // ============================================================

    #[test]
    fn normal_cdf_at_zero_is_half() {
        assert_close(standard_normal_cdf(0.0), 0.5, 1e-7);
    }

    #[test]
    fn normal_cdf_known_values() {
        assert_close(standard_normal_cdf(1.96), 0.975, 1e-3);
        assert_close(standard_normal_cdf(-1.96), 0.025, 1e-3);
        assert_close(standard_normal_cdf(3.0), 0.998_65, 1e-4);
    }

    #[test]
    fn inverse_normal_cdf_round_trips() {
        for &p in &[0.01, 0.05, 0.25, 0.5, 0.75, 0.95, 0.99] {
            let z = inverse_normal_cdf(p);
            assert_close(standard_normal_cdf(z), p, 1e-4);
        }
    }

    #[test]
    fn inverse_normal_cdf_known_values() {
        assert_close(inverse_normal_cdf(0.5), 0.0, 1e-8);
        assert_close(inverse_normal_cdf(0.975), 1.959_96, 1e-4);
        assert_close(inverse_normal_cdf(0.025), -1.959_96, 1e-4);
    }

    #[test]
    fn inverse_normal_cdf_is_monotonic() {
        let mut last = f64::NEG_INFINITY;
        for i in 1..100 {
            let z = inverse_normal_cdf(i as f64 / 100.0);
            assert!(z > last, "quantile not monotonic at p={}", i as f64 / 100.0);
            last = z;
        }
    }

    #[test]
    fn inverse_normal_cdf_extreme_input_is_finite() {
        assert!(inverse_normal_cdf(0.0).is_finite());
        assert!(inverse_normal_cdf(1.0).is_finite());
    }
}
