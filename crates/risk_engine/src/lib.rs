//! # risk_engine (L4: Application)
//!
//! Cached, single-flight tail-risk simulations.
//!
//! This crate provides:
//! - [`RiskEngine`]: the `run_simulation` entry point and stress tests
//! - Request fingerprints for cache keys (`fingerprint`)
//! - The [`CacheStore`] backend seam with an in-memory default (`cache`)
//! - Engine configuration with validation (`config`)
//! - Price and volatility stress scenarios (`stress`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            risk_engine (L4)             │
//! │  cache, single-flight, timeout, stress  │
//! └─────────────────────────────────────────┘
//!          ↓                      ↓
//! ┌──────────────────┐  ┌──────────────────┐
//! │ risk_simulation  │  │  risk_metrics    │
//! │ (L2) GBM kernel  │  │  (L3) VaR/CVaR   │
//! └──────────────────┘  └──────────────────┘
//!          ↓                      ↓
//! ┌─────────────────────────────────────────┐
//! │             risk_core (L1)              │
//! └─────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod outcome;
pub mod stress;

pub use cache::{CacheEntry, CacheError, CacheStats, CacheStore, InMemoryCache};
pub use config::{ConfigError, EngineConfig, EngineConfigBuilder};
pub use engine::{RiskEngine, RiskEngineBuilder};
pub use error::EngineError;
pub use fingerprint::Fingerprint;
pub use outcome::SimulationOutcome;
pub use stress::{StressOutcome, StressScenario};
