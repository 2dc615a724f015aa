//! Error types for risk metric computation.

use thiserror::Error;

/// Errors raised by [`crate::RiskMetricsCalculator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// The ensemble holds no price.
    #[error("Cannot compute risk metrics over an empty ensemble")]
    EmptyEnsemble,

    /// No confidence level was configured.
    #[error("At least one confidence level is required")]
    NoConfidenceLevels,
}
