//! Dense linear algebra kernel for the validation gates.
//!
//! Provides Gauss-Jordan matrix inversion with partial pivoting and
//! multivariate ordinary-least-squares regression via the normal equations.
//! Both operations degrade instead of failing: a singular matrix inverts to
//! `None`, and a regression whose normal matrix cannot be inverted returns
//! all-zero coefficients with R² = 0 so callers can treat "regression
//! impossible" as "no explanatory power".

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pivot magnitudes below this are treated as singular.
const SINGULARITY_THRESHOLD: f64 = 1e-12;

/// Result of an ordinary-least-squares regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Fitted coefficients; index 0 is the intercept, the rest follow the
    /// column order of the design matrix.
    pub coefficients: Vec<f64>,
    /// Coefficient of determination, clamped to [0, 1].
    pub r_squared: f64,
    /// Per-observation residuals (actual minus fitted).
    pub residuals: Vec<f64>,
    /// Number of observations used in the fit.
    pub n_observations: usize,
}

impl RegressionResult {
    /// A regression that explains nothing: zero coefficients, R² = 0, and
    /// residuals equal to the original targets.
    #[must_use]
    pub fn null_fit(n_predictors: usize, y: &[f64]) -> Self {
        Self {
            coefficients: vec![0.0; n_predictors + 1],
            r_squared: 0.0,
            residuals: y.to_vec(),
            n_observations: y.len(),
        }
    }

    /// Predicted value for one row of predictor values.
    #[must_use]
    pub fn predict(&self, predictors: &[f64]) -> f64 {
        let mut value = self.coefficients.first().copied().unwrap_or(0.0);
        for (coef, x) in self.coefficients.iter().skip(1).zip(predictors.iter()) {
            value += coef * x;
        }
        value
    }
}

/// Inverts a square matrix using Gauss-Jordan elimination with partial
/// pivoting.
///
/// The row with the largest absolute value in the current column is chosen
/// as the pivot. If the best available pivot has magnitude below `1e-12`
/// the matrix is declared singular.
///
/// # Arguments
/// * `matrix` - Square matrix in row-major `Vec<Vec<f64>>` form
///
/// # Returns
/// `Some(inverse)` on success, `None` for singular or non-square input.
#[must_use]
pub fn invert_matrix(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    if n == 0 || matrix.iter().any(|row| row.len() != n) {
        return None;
    }

    // Build the augmented [M | I] matrix.
    let mut aug: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut extended = row.clone();
            extended.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            extended
        })
        .collect();

    for col in 0..n {
        // Partial pivoting: pick the remaining row with the largest
        // absolute value in this column.
        let mut pivot_row = col;
        let mut pivot_mag = aug[col][col].abs();
        for row in col + 1..n {
            let mag = aug[row][col].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }

        if pivot_mag < SINGULARITY_THRESHOLD {
            return None;
        }

        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for value in &mut aug[col] {
            *value /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in 0..2 * n {
                aug[row][k] -= factor * aug[col][k];
            }
        }
    }

    Some(aug.into_iter().map(|row| row[n..].to_vec()).collect())
}

/// Fits `y = b0 + b1*x1 + ... + bk*xk` by ordinary least squares.
///
/// An intercept column is prepended to the design matrix, the normal
/// equations `XᵗX b = Xᵗy` are formed, and `XᵗX` is inverted with
/// [`invert_matrix`]. If inversion fails (collinear predictors, too few
/// rows) the result is the null fit: all-zero coefficients and R² = 0.
///
/// Callers must supply `x` rows aligned with `y`; rows of differing width
/// or a row count different from `y.len()` also yield the null fit, since
/// the gates only call this with pre-validated input.
///
/// # Arguments
/// * `x` - Predictor rows, one `Vec<f64>` of length k per observation
/// * `y` - Target values, one per observation
#[must_use]
pub fn linear_regression(x: &[Vec<f64>], y: &[f64]) -> RegressionResult {
    let n = y.len();
    let k = x.first().map_or(0, Vec::len);

    if n == 0 || x.len() != n || x.iter().any(|row| row.len() != k) {
        return RegressionResult::null_fit(k, y);
    }
    // Need more observations than parameters for a meaningful fit.
    if n <= k {
        return RegressionResult::null_fit(k, y);
    }

    let width = k + 1;

    // Normal equations over the intercept-augmented design matrix.
    let mut xtx = vec![vec![0.0; width]; width];
    let mut xty = vec![0.0; width];

    for (row, &target) in x.iter().zip(y.iter()) {
        for i in 0..width {
            let xi = if i == 0 { 1.0 } else { row[i - 1] };
            xty[i] += xi * target;
            for j in i..width {
                let xj = if j == 0 { 1.0 } else { row[j - 1] };
                xtx[i][j] += xi * xj;
            }
        }
    }
    // Mirror the upper triangle.
    for i in 0..width {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let Some(inverse) = invert_matrix(&xtx) else {
        debug!(
            n_observations = n,
            n_predictors = k,
            "normal matrix is singular, returning null fit"
        );
        return RegressionResult::null_fit(k, y);
    };

    let coefficients: Vec<f64> = inverse
        .iter()
        .map(|row| row.iter().zip(xty.iter()).map(|(a, b)| a * b).sum())
        .collect();

    // Residual and total sums of squares for R².
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let mut ss_residual = 0.0;
    let mut ss_total = 0.0;
    let mut residuals = Vec::with_capacity(n);

    for (row, &actual) in x.iter().zip(y.iter()) {
        let mut fitted = coefficients[0];
        for (coef, value) in coefficients.iter().skip(1).zip(row.iter()) {
            fitted += coef * value;
        }
        let residual = actual - fitted;
        ss_residual += residual * residual;
        ss_total += (actual - mean_y) * (actual - mean_y);
        residuals.push(residual);
    }

    let r_squared = if ss_total < f64::EPSILON {
        0.0
    } else {
        (1.0 - ss_residual / ss_total).clamp(0.0, 1.0)
    };

    RegressionResult {
        coefficients,
        r_squared,
        residuals,
        n_observations: n,
    }
}
