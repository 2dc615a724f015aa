//! # risk_metrics (L3: Analytics)
//!
//! Tail-risk statistics over a simulated ensemble of terminal prices.
//!
//! For each confidence level `c` the calculator forms P&L relative to the
//! initial price, takes the `(1 − c)` percentile `q` with linear
//! interpolation between order statistics, and reports
//!
//! ```text
//! VaR(c)  = max(0, −q)
//! CVaR(c) = max(0, −mean{ pnl ≤ q })
//! ```
//!
//! All levels share a single sort of the ensemble.
//!
//! ## Example
//!
//! ```
//! use risk_core::ConfidenceLevel;
//! use risk_metrics::RiskMetricsCalculator;
//!
//! let levels = vec![ConfidenceLevel::new(0.95).unwrap()];
//! let calculator = RiskMetricsCalculator::new(levels).unwrap();
//!
//! let ensemble: Vec<f64> = (0..100).map(|i| 50.0 + i as f64).collect();
//! let summary = calculator.compute(&ensemble, 100.0).unwrap();
//! assert!(summary.var(0.95).unwrap() > 0.0);
//! assert!(summary.cvar(0.95).unwrap() >= summary.var(0.95).unwrap());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calculator;
pub mod error;

pub use calculator::RiskMetricsCalculator;
pub use error::MetricsError;
