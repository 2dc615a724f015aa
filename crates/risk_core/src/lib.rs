//! # risk_core: Foundation Types for Tail-Risk Simulation
//!
//! ## Layer 1 (Foundation) Role
//!
//! risk_core is the bottom layer of the workspace and provides:
//! - The simulation request and its validation (`types::request`)
//! - Confidence levels and the immutable risk summary (`types::summary`)
//! - Validation error taxonomy (`types::error`)
//! - Order-statistic helpers shared by the analytics layer (`math`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other risk_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - serde: Serialisation of requests and summaries
//!
//! ## Usage Examples
//!
//! ```rust
//! use risk_core::types::{ConfidenceLevel, SimulationRequest};
//!
//! let request = SimulationRequest::new("AAPL", 100.0, 0.20, 0.05, 252, 10_000);
//! assert!(request.validate().is_ok());
//! assert_eq!(request.horizon_years(), 1.0);
//!
//! let level = ConfidenceLevel::new(0.99).unwrap();
//! assert!((level.tail_probability() - 0.01).abs() < 1e-12);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;

pub use types::{
    ConfidenceLevel, LevelRisk, RiskSummary, SimulationRequest, ValidationError, MAX_HORIZON_DAYS,
    MAX_PATHS, TRADING_DAYS_PER_YEAR,
};
