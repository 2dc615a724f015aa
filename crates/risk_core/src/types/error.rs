//! Validation errors for simulation input.
//!
//! A [`ValidationError`] is raised before any computation starts and is
//! never retried automatically: the caller has to fix the request.

use thiserror::Error;

/// Malformed simulation input.
///
/// # Examples
/// ```
/// use risk_core::types::ValidationError;
///
/// let err = ValidationError::InvalidPathCount(0);
/// assert_eq!(
///     format!("{}", err),
///     "Invalid path count 0: must be in range [1, 10000000]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Initial price not strictly positive or not finite.
    #[error("Invalid initial price {0}: must be positive and finite")]
    InvalidInitialPrice(f64),

    /// Volatility negative or not finite.
    #[error("Invalid volatility {0}: must be non-negative and finite")]
    InvalidVolatility(f64),

    /// Drift not finite.
    #[error("Invalid drift {0}: must be finite")]
    InvalidDrift(f64),

    /// Horizon outside [1, 10_000] trading days.
    #[error("Invalid horizon {0} days: must be in range [1, 10000]")]
    InvalidHorizon(u32),

    /// Path count outside [1, 10_000_000].
    #[error("Invalid path count {0}: must be in range [1, 10000000]")]
    InvalidPathCount(usize),

    /// Confidence level not strictly inside (0, 1).
    #[error("Invalid confidence level {0}: must lie strictly between 0 and 1")]
    InvalidConfidenceLevel(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_initial_price() {
        let err = ValidationError::InvalidInitialPrice(-1.0);
        assert_eq!(
            format!("{}", err),
            "Invalid initial price -1: must be positive and finite"
        );
    }

    #[test]
    fn test_error_display_horizon() {
        let err = ValidationError::InvalidHorizon(0);
        assert!(err.to_string().contains("Invalid horizon 0 days"));
    }

    #[test]
    fn test_error_display_confidence() {
        let err = ValidationError::InvalidConfidenceLevel(1.5);
        assert!(err.to_string().contains("strictly between 0 and 1"));
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(ValidationError::InvalidDrift(f64::NAN));
        assert!(err.to_string().contains("drift"));
    }
}
