//! Error types for the simulation kernel.

use risk_core::ValidationError;
use thiserror::Error;

/// Errors raised while partitioning, generating or aggregating paths.
///
/// Any chunk failure fails the whole simulation; no partial ensemble is
/// ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Request rejected before dispatch.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A chunk produced a non-finite terminal price.
    #[error("Numerical overflow in chunk {chunk}: terminal price {value}")]
    NonFinitePrice {
        /// Index of the failing chunk.
        chunk: usize,
        /// Offending value.
        value: f64,
    },

    /// A chunk observed the cancellation flag and stopped.
    #[error("Simulation cancelled")]
    Cancelled,

    /// A worker panicked while running a chunk.
    #[error("Worker panicked in chunk {chunk}: {message}")]
    WorkerPanic {
        /// Index of the failing chunk.
        chunk: usize,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// Aggregated ensemble length differs from the requested path count.
    #[error("Ensemble length mismatch: expected {expected}, got {actual}")]
    EnsembleLengthMismatch {
        /// Requested path count.
        expected: usize,
        /// Aggregated length.
        actual: usize,
    },

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    PoolBuild(String),

    /// Invalid simulation configuration.
    #[error("Invalid configuration '{name}': {value}")]
    InvalidConfig {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}
