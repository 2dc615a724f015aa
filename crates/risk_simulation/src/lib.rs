//! # risk_simulation (L2: Simulation Kernel)
//!
//! Parallel Geometric Brownian Motion Monte Carlo for terminal prices.
//!
//! This crate provides:
//! - Seeded per-chunk random number generation (`rng`)
//! - GBM terminal-price and trajectory generation (`gbm`)
//! - Even workload partitioning over a fixed concurrency (`partition`)
//! - Chunk dispatch onto an owned Rayon worker pool (`dispatch`)
//! - Ensemble aggregation with a length check (`aggregate`)
//! - The [`MonteCarloSimulator`] tying them together (`simulator`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          risk_simulation (L2)           │
//! ├─────────────────────────────────────────┤
//! │  partition/  - chunk sizes and seeds    │
//! │  dispatch/   - worker pool, cancel flag │
//! │  gbm/        - per-chunk path kernel    │
//! │  aggregate/  - ensemble concatenation   │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │             risk_core (L1)              │
//! │  SimulationRequest, validation          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use risk_core::SimulationRequest;
//! use risk_simulation::{CancelFlag, MonteCarloSimulator, SimulationConfig, WorkerPool};
//!
//! let pool = Arc::new(WorkerPool::new(4).unwrap());
//! let simulator = MonteCarloSimulator::new(pool, SimulationConfig::default());
//!
//! let request = SimulationRequest::new("AAPL", 100.0, 0.20, 0.05, 252, 10_000);
//! let run = simulator.simulate(&request, &CancelFlag::new()).unwrap();
//! assert_eq!(run.ensemble.len(), 10_000);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gbm;
pub mod partition;
pub mod rng;
pub mod simulator;

pub use aggregate::Ensemble;
pub use config::{SamplingScheme, SimulationConfig, MAX_TRAJECTORY_SAMPLE};
pub use dispatch::{CancelFlag, ChunkDispatcher, SequentialDispatcher, WorkerPool};
pub use error::SimulationError;
pub use gbm::TrajectorySample;
pub use simulator::{MonteCarloSimulator, SimulationRun};
