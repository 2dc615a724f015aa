//! Monte Carlo simulator.
//!
//! [`MonteCarloSimulator`] ties the kernel together: validate the request,
//! partition it over the dispatcher's concurrency, run the chunks and
//! aggregate the outputs. Validation always happens before any work is
//! dispatched.

use std::sync::Arc;

use risk_core::SimulationRequest;

use crate::aggregate::{aggregate, Ensemble};
use crate::config::SimulationConfig;
use crate::dispatch::{CancelFlag, ChunkDispatcher};
use crate::error::SimulationError;
use crate::gbm::{simulate_chunk, TrajectorySample};
use crate::partition::plan_chunks;

/// Result of one simulation run.
#[derive(Clone, Debug)]
pub struct SimulationRun {
    /// Terminal prices of every path.
    pub ensemble: Ensemble,
    /// Retained full trajectories, if configured.
    pub trajectories: Option<TrajectorySample>,
    /// Number of chunks the request was split into.
    pub chunks: usize,
}

/// GBM Monte Carlo simulator over a pluggable dispatcher.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use risk_core::SimulationRequest;
/// use risk_simulation::{CancelFlag, MonteCarloSimulator, SimulationConfig, WorkerPool};
///
/// let pool = Arc::new(WorkerPool::new(2).unwrap());
/// let config = SimulationConfig::builder().seed(42).build().unwrap();
/// let simulator = MonteCarloSimulator::new(pool, config);
///
/// let request = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 21, 1_001);
/// let run = simulator.simulate(&request, &CancelFlag::new()).unwrap();
/// assert_eq!(run.ensemble.len(), 1_001);
/// assert_eq!(run.chunks, 2);
/// ```
#[derive(Clone)]
pub struct MonteCarloSimulator {
    dispatcher: Arc<dyn ChunkDispatcher>,
    config: SimulationConfig,
}

impl MonteCarloSimulator {
    /// Creates a simulator.
    pub fn new(dispatcher: Arc<dyn ChunkDispatcher>, config: SimulationConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Kernel configuration.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of chunks each request is split into.
    #[inline]
    pub fn concurrency(&self) -> usize {
        self.dispatcher.concurrency()
    }

    /// Runs one simulation.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Validation` if the request is invalid; nothing is
    ///   dispatched in that case
    /// - any chunk failure, which fails the whole run
    pub fn simulate(
        &self,
        request: &SimulationRequest,
        cancel: &CancelFlag,
    ) -> Result<SimulationRun, SimulationError> {
        request.validate()?;
        self.config.validate()?;

        let base_seed = self.config.seed().unwrap_or_else(rand::random);
        let tasks = plan_chunks(request, self.concurrency(), &self.config, base_seed);
        tracing::debug!(
            asset = %request.asset_id,
            paths = request.path_count,
            chunks = tasks.len(),
            scheme = %self.config.scheme(),
            "dispatching simulation"
        );

        let outputs = self.dispatcher.dispatch(&tasks, cancel, &simulate_chunk)?;
        let (ensemble, trajectories) = aggregate(outputs, request.path_count)?;

        Ok(SimulationRun {
            ensemble,
            trajectories,
            chunks: tasks.len(),
        })
    }
}

impl std::fmt::Debug for MonteCarloSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonteCarloSimulator")
            .field("concurrency", &self.concurrency())
            .field("config", &self.config)
            .finish()
    }
}
