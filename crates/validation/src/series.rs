//! Series plumbing shared by the gates.
//!
//! Turns a (signal, return) pair into the directional strategy return
//! stream every gate scores: the sign of the signal applied to the
//! realized forward return.

/// Derives forward returns by shifting `returns` one step ahead.
///
/// The final observation has no realized forward return and receives a 0.0
/// sentinel, keeping the output aligned with the input length.
#[must_use]
pub fn derive_forward_returns(returns: &[f64]) -> Vec<f64> {
    if returns.is_empty() {
        return vec![];
    }
    let mut forward: Vec<f64> = returns[1..].to_vec();
    forward.push(0.0);
    forward
}

/// Signal-driven strategy returns: `sign(signal[t]) * forward_return[t]`.
///
/// A zero signal takes no position and contributes a 0.0 return. Inputs
/// must already be aligned; the shorter length wins if they are not.
#[must_use]
pub fn strategy_returns(signals: &[f64], forward_returns: &[f64]) -> Vec<f64> {
    signals
        .iter()
        .zip(forward_returns.iter())
        .map(|(signal, fwd)| {
            if *signal > 0.0 {
                *fwd
            } else if *signal < 0.0 {
                -*fwd
            } else {
                0.0
            }
        })
        .collect()
}

/// Resolves the forward-return series: the supplied one when present,
/// otherwise derived from `returns` by a one-step shift.
#[must_use]
pub fn resolve_forward_returns(returns: &[f64], supplied: Option<&[f64]>) -> Vec<f64> {
    match supplied {
        Some(fwd) => fwd.to_vec(),
        None => derive_forward_returns(returns),
    }
}
