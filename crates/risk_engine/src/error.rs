//! Engine error taxonomy.

use risk_core::ValidationError;
use risk_metrics::MetricsError;
use risk_simulation::SimulationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by [`crate::RiskEngine`].
///
/// `Clone` so that one in-flight result can be handed to every caller
/// waiting on the same fingerprint. Cache faults never appear here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Rejected input; retrying the same request cannot succeed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected stress scenario.
    #[error("Invalid stress scenario: {0}")]
    InvalidScenario(String),

    /// A chunk or the aggregation failed; nothing was cached.
    #[error("Computation error: {0}")]
    Computation(String),

    /// The computation exceeded its wall-clock limit and was cancelled.
    #[error("Computation timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured limit.
        timeout_ms: u64,
    },

    /// The engine could not be configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::InvalidScenario(_)
        )
    }
}

impl From<SimulationError> for EngineError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Validation(e) => EngineError::Validation(e),
            SimulationError::InvalidConfig { .. } | SimulationError::PoolBuild(_) => {
                EngineError::Config(ConfigError::InvalidValue {
                    name: "simulation",
                    reason: err.to_string(),
                })
            }
            other => EngineError::Computation(other.to_string()),
        }
    }
}

impl From<MetricsError> for EngineError {
    fn from(err: MetricsError) -> Self {
        EngineError::Computation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_error_mapping() {
        let err: EngineError = SimulationError::Cancelled.into();
        assert_eq!(err, EngineError::Computation("Simulation cancelled".to_string()));
        assert!(!err.is_client_error());

        let err: EngineError =
            SimulationError::Validation(ValidationError::InvalidPathCount(0)).into();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.is_client_error());

        let err: EngineError = SimulationError::PoolBuild("no threads".to_string()).into();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_metrics_error_mapping() {
        let err: EngineError = MetricsError::EmptyEnsemble.into();
        assert!(matches!(err, EngineError::Computation(_)));
    }

    #[test]
    fn test_timeout_display() {
        let err = EngineError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "Computation timed out after 250 ms");
        assert!(!err.is_client_error());
    }
}
