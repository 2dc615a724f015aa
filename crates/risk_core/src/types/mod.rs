//! Core types for tail-risk simulation.
//!
//! This module provides:
//! - [`SimulationRequest`]: the validated input of one simulation
//! - [`ConfidenceLevel`]: a probability strictly inside (0, 1)
//! - [`RiskSummary`] and [`LevelRisk`]: the immutable result of one simulation
//! - [`ValidationError`]: malformed-input errors

pub mod error;
pub mod request;
pub mod summary;

pub use error::ValidationError;
pub use request::{SimulationRequest, MAX_HORIZON_DAYS, MAX_PATHS, TRADING_DAYS_PER_YEAR};
pub use summary::{ConfidenceLevel, LevelRisk, RiskSummary};
