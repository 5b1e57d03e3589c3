//! Information Coefficient analysis.
//!
//! The IC is the Spearman rank correlation between signal values and
//! forward returns, measured over rolling windows so its stability is
//! observable as well as its level. ICIR (mean IC over its standard
//! deviation) summarizes both in one number.

use serde::{Deserialize, Serialize};
use signal_gate_core::{mean, spearman_correlation, std_dev, Result, ValidationError};

use crate::series::resolve_forward_returns;

/// Smallest window that still yields a meaningful rank correlation.
const MIN_WINDOW_OBSERVATIONS: usize = 3;

/// Configuration for the rolling IC calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcConfig {
    /// Observations per rolling window.
    pub window: usize,
}

impl Default for IcConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl IcConfig {
    /// Creates a config with a custom window size.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(MIN_WINDOW_OBSERVATIONS),
        }
    }
}

/// Rolling information-coefficient statistics for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcStats {
    /// Mean IC across windows.
    pub mean: f64,
    /// Standard deviation of the IC across windows.
    pub std: f64,
    /// IC information ratio: mean / std, or 0 when std is 0.
    pub icir: f64,
    /// Fraction of observations where the signal sign agreed with the
    /// forward return sign, in [0, 1].
    pub hit_rate: f64,
    /// Total observations analyzed.
    pub n_observations: usize,
    /// Number of rolling windows scored.
    pub n_windows: usize,
}

/// Computes rolling IC statistics between a signal and forward returns.
///
/// Forward returns are taken from `forward_returns` when supplied,
/// otherwise derived from `returns` by a one-step shift with a trailing
/// sentinel. Windows are non-overlapping; a final partial window is kept
/// when it still holds enough observations for a rank correlation, and a
/// series shorter than one window is scored as a single window. A constant
/// signal has zero rank variance and scores IC 0 in every window, a
/// defined value rather than an undefined correlation.
///
/// # Errors
/// Returns `LengthMismatch` if `signals`, `returns`, or a supplied
/// `forward_returns` differ in length.
pub fn compute_ic(
    signals: &[f64],
    returns: &[f64],
    forward_returns: Option<&[f64]>,
    config: &IcConfig,
) -> Result<IcStats> {
    if signals.len() != returns.len() {
        return Err(ValidationError::length_mismatch(signals.len(), returns.len()));
    }
    if let Some(fwd) = forward_returns {
        if fwd.len() != signals.len() {
            return Err(ValidationError::length_mismatch(signals.len(), fwd.len()));
        }
    }

    let forward = resolve_forward_returns(returns, forward_returns);
    let n = signals.len();

    if n == 0 {
        return Ok(IcStats {
            mean: 0.0,
            std: 0.0,
            icir: 0.0,
            hit_rate: 0.0,
            n_observations: 0,
            n_windows: 0,
        });
    }

    let window = config.window.max(MIN_WINDOW_OBSERVATIONS);
    let mut window_ics = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + window).min(n);
        let len = end - start;
        if len >= MIN_WINDOW_OBSERVATIONS {
            window_ics.push(spearman_correlation(
                &signals[start..end],
                &forward[start..end],
            ));
        } else if window_ics.is_empty() {
            // Series shorter than any usable window: one degenerate window
            // with IC 0 keeps every field defined.
            window_ics.push(0.0);
        }
        start = end;
    }

    let ic_mean = mean(&window_ics);
    let ic_std = std_dev(&window_ics);
    let icir = if ic_std < f64::EPSILON {
        0.0
    } else {
        ic_mean / ic_std
    };

    // Hit rate over observations where both sides take a side.
    let mut agreements = 0usize;
    let mut qualifying = 0usize;
    for (signal, fwd) in signals.iter().zip(forward.iter()) {
        if *signal != 0.0 && *fwd != 0.0 {
            qualifying += 1;
            if (*signal > 0.0) == (*fwd > 0.0) {
                agreements += 1;
            }
        }
    }
    let hit_rate = if qualifying == 0 {
        0.0
    } else {
        agreements as f64 / qualifying as f64
    };

    Ok(IcStats {
        mean: ic_mean,
        std: ic_std,
        icir,
        hit_rate,
        n_observations: n,
        n_windows: window_ics.len(),
    })
}
