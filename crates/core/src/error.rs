//! Error types for the validation core.
//!
//! Only caller programming errors surface here: mismatched series lengths,
//! invalid split counts, series too short for the requested analysis.
//! Numeric degeneracy (singular matrices, zero-variance series) is handled
//! locally by each component with a conservative fallback and never becomes
//! an error.

use thiserror::Error;

/// Errors raised for malformed input to a validation gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two series that must be aligned have different lengths.
    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first series.
        left: usize,
        /// Length of the second series.
        right: usize,
    },

    /// The series is too short for the requested analysis.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum observations required.
        required: usize,
        /// Observations actually supplied.
        actual: usize,
    },

    /// The CSCV split count must be a positive even number.
    #[error("invalid split count {n_splits}: must be a positive even number")]
    InvalidSplitCount {
        /// The rejected split count.
        n_splits: usize,
    },

    /// An input series contained no observations.
    #[error("empty input series")]
    EmptySeries,
}

impl ValidationError {
    /// Creates a length-mismatch error.
    #[must_use]
    pub fn length_mismatch(left: usize, right: usize) -> Self {
        Self::LengthMismatch { left, right }
    }

    /// Creates an insufficient-data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}

/// Convenience result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Checks that two aligned series have equal lengths.
///
/// # Errors
/// Returns `ValidationError::LengthMismatch` if the lengths differ.
pub fn ensure_equal_len(left: &[f64], right: &[f64]) -> Result<()> {
    if left.len() == right.len() {
        Ok(())
    } else {
        Err(ValidationError::length_mismatch(left.len(), right.len()))
    }
}
