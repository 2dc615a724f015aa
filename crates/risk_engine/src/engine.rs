//! The risk engine entry points.
//!
//! Control flow of one request:
//!
//! ```text
//! validate → fingerprint → cache read ─hit──────────────────────→ result
//!                              │miss
//!                              ↓
//!                   join in-flight cell for fingerprint
//!                              │first caller only
//!                              ↓
//!        simulate (blocking pool, timeout) → VaR/CVaR → cache write
//! ```
//!
//! At most one computation per fingerprint runs at a time; concurrent
//! callers for the same fingerprint await the same cell and observe the
//! same result, success or failure. Failures are never cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use risk_core::{RiskSummary, SimulationRequest};
use risk_metrics::RiskMetricsCalculator;
use risk_simulation::{CancelFlag, ChunkDispatcher, MonteCarloSimulator, WorkerPool};
use tokio::sync::OnceCell;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, CacheStore, InMemoryCache};
use crate::config::{ConfigError, EngineConfig};
use crate::error::EngineError;
use crate::fingerprint::Fingerprint;
use crate::outcome::SimulationOutcome;
use crate::stress::{price_shock, StressOutcome, StressScenario};

type SharedResult = Result<Arc<SimulationOutcome>, EngineError>;
type InFlightCell = Arc<OnceCell<SharedResult>>;

/// Cached, single-flight Monte Carlo tail-risk engine.
///
/// # Examples
///
/// ```rust
/// use risk_core::SimulationRequest;
/// use risk_engine::{EngineConfig, RiskEngine};
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let config = EngineConfig::builder().workers(2).seed(42).build().unwrap();
///     let engine = RiskEngine::new(config).unwrap();
///
///     let request = SimulationRequest::new("AAPL", 100.0, 0.20, 0.05, 252, 10_000);
///     let summary = engine.run_simulation(&request).await.unwrap();
///     assert!(summary.cvar(0.99).unwrap() >= summary.var(0.99).unwrap());
///
///     // Served from the cache
///     engine.run_simulation(&request).await.unwrap();
///     assert_eq!(engine.computations(), 1);
/// });
/// ```
pub struct RiskEngine {
    simulator: MonteCarloSimulator,
    calculator: RiskMetricsCalculator,
    cache: Option<Arc<dyn CacheStore>>,
    config: EngineConfig,
    in_flight: Mutex<HashMap<Fingerprint, InFlightCell>>,
    counters: CacheCounters,
    computations: AtomicU64,
}

impl RiskEngine {
    /// Creates an engine with its own worker pool and in-memory cache.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the configuration is invalid or the
    /// worker pool cannot be started.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::builder(config).build()
    }

    /// Creates a builder for plugging in a dispatcher or cache backend.
    pub fn builder(config: EngineConfig) -> RiskEngineBuilder {
        RiskEngineBuilder {
            config,
            dispatcher: None,
            cache: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a simulation and returns its risk summary.
    ///
    /// Results are served from the cache when a live entry exists.
    ///
    /// # Errors
    ///
    /// - `EngineError::Validation` for invalid input; nothing is dispatched
    /// - `EngineError::Computation` if any chunk fails
    /// - `EngineError::Timeout` if the computation exceeds the limit
    pub async fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> Result<RiskSummary, EngineError> {
        let outcome = self.run_simulation_with_paths(request).await?;
        Ok(outcome.summary.clone())
    }

    /// Same as [`RiskEngine::run_simulation`], returning the shared outcome
    /// including any retained trajectories.
    ///
    /// # Errors
    ///
    /// See [`RiskEngine::run_simulation`].
    pub async fn run_simulation_with_paths(
        &self,
        request: &SimulationRequest,
    ) -> Result<Arc<SimulationOutcome>, EngineError> {
        request.validate()?;
        let fingerprint = Fingerprint::of(request);

        let Some(cache) = self.cache.as_deref() else {
            return self.compute(request, &fingerprint).await;
        };

        if let Some(outcome) = self.lookup(cache, &fingerprint).await {
            self.counters.hit();
            tracing::debug!(fingerprint = fingerprint.short(), "cache hit");
            return Ok(outcome);
        }
        self.counters.miss();

        let cell = self.join_in_flight(&fingerprint);
        let result = cell
            .get_or_init(|| self.compute_and_store(cache, request, &fingerprint))
            .await
            .clone();
        self.leave_in_flight(&fingerprint, &cell);
        result
    }

    /// Applies a stress scenario to `request`.
    ///
    /// Vol shocks re-run the simulation through the cache.
    ///
    /// # Errors
    ///
    /// - `EngineError::Validation` for an invalid request
    /// - `EngineError::InvalidScenario` for an invalid shock
    /// - any error of [`RiskEngine::run_simulation`] for vol shocks
    pub async fn run_stress_test(
        &self,
        request: &SimulationRequest,
        scenario: StressScenario,
    ) -> Result<StressOutcome, EngineError> {
        request.validate()?;
        scenario.validate()?;
        tracing::debug!(
            asset_id = %request.asset_id,
            shock = scenario.shock(),
            "running stress scenario"
        );

        match scenario {
            StressScenario::PriceShock(shock) => Ok(price_shock(request, shock)),
            StressScenario::VolShock(shock) => {
                let stressed = scenario.stressed_request(request);
                let summary = self.run_simulation(&stressed).await?;
                Ok(StressOutcome::VolShock {
                    shock_value: shock,
                    stressed_volatility: stressed.volatility,
                    summary,
                })
            }
        }
    }

    /// Cache activity so far.
    pub fn cache_stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Number of simulations actually run (cache hits excluded).
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    /// Whether a cache backend is configured.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Drops expired cache entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let Some(cache) = self.cache.as_deref() else {
            return 0;
        };
        match cache.purge_expired().await {
            Ok(purged) => {
                if purged > 0 {
                    tracing::debug!(purged, "expired cache entries purged");
                }
                purged
            }
            Err(err) => {
                self.counters.error();
                tracing::warn!(error = %err, "cache purge failed");
                0
            }
        }
    }

    /// Stops the engine and its worker pool.
    pub fn shutdown(self) {
        tracing::info!(
            computations = self.computations(),
            "risk engine shutting down"
        );
    }

    /// Cache read that absorbs backend failures.
    async fn lookup(
        &self,
        cache: &dyn CacheStore,
        fingerprint: &Fingerprint,
    ) -> Option<Arc<SimulationOutcome>> {
        match cache.get(fingerprint).await {
            Ok(hit) => hit,
            Err(err) => {
                self.counters.error();
                tracing::warn!(
                    fingerprint = fingerprint.short(),
                    error = %err,
                    "cache read failed, computing"
                );
                None
            }
        }
    }

    async fn compute_and_store(
        &self,
        cache: &dyn CacheStore,
        request: &SimulationRequest,
        fingerprint: &Fingerprint,
    ) -> SharedResult {
        // A previous cell may have stored the result after our lookup
        if let Some(outcome) = self.lookup(cache, fingerprint).await {
            return Ok(outcome);
        }

        let outcome = self.compute(request, fingerprint).await?;
        let entry = CacheEntry::new(fingerprint.clone(), outcome.clone(), self.config.cache_ttl());
        match cache.insert_if_absent(entry).await {
            Ok(true) => self.counters.set(),
            Ok(false) => {}
            Err(err) => {
                self.counters.error();
                tracing::warn!(
                    fingerprint = fingerprint.short(),
                    error = %err,
                    "cache write failed"
                );
            }
        }
        Ok(outcome)
    }

    /// Runs the pipeline on the blocking pool under the configured timeout.
    async fn compute(&self, request: &SimulationRequest, fingerprint: &Fingerprint) -> SharedResult {
        self.computations.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let cancel = CancelFlag::new();
        let _cancel_on_drop = CancelOnDrop(cancel.clone());

        let simulator = self.simulator.clone();
        let calculator = self.calculator.clone();
        let owned = request.clone();
        let task = tokio::task::spawn_blocking(move || {
            let run = simulator.simulate(&owned, &cancel)?;
            let summary = calculator.compute(run.ensemble.prices(), owned.initial_price)?;
            let outcome = SimulationOutcome {
                summary,
                trajectories: run.trajectories,
            };
            Ok::<_, EngineError>((outcome, run.chunks))
        });

        let timeout_ms = self.config.timeout_ms;
        let (outcome, chunks) = match tokio::time::timeout(self.config.timeout(), task).await {
            Ok(Ok(Ok(done))) => done,
            Ok(Ok(Err(err))) => {
                tracing::warn!(fingerprint = fingerprint.short(), error = %err, "simulation failed");
                return Err(err);
            }
            Ok(Err(join_err)) => {
                return Err(EngineError::Computation(format!(
                    "simulation task failed: {join_err}"
                )));
            }
            Err(_) => {
                tracing::warn!(
                    fingerprint = fingerprint.short(),
                    timeout_ms,
                    "simulation timed out, cancelling chunks"
                );
                return Err(EngineError::Timeout { timeout_ms });
            }
        };

        tracing::info!(
            fingerprint = fingerprint.short(),
            asset = %request.asset_id,
            paths = request.path_count,
            chunks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "simulation computed"
        );
        Ok(Arc::new(outcome))
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<Fingerprint, InFlightCell>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join_in_flight(&self, fingerprint: &Fingerprint) -> InFlightCell {
        self.in_flight()
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    fn leave_in_flight(&self, fingerprint: &Fingerprint, cell: &InFlightCell) {
        let mut in_flight = self.in_flight();
        if in_flight
            .get(fingerprint)
            .is_some_and(|current| Arc::ptr_eq(current, cell))
        {
            in_flight.remove(fingerprint);
        }
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("simulator", &self.simulator)
            .field("cache_enabled", &self.cache_enabled())
            .field("config", &self.config)
            .finish()
    }
}

/// Raises the flag when the awaiting caller goes away.
struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Builder for [`RiskEngine`].
pub struct RiskEngineBuilder {
    config: EngineConfig,
    dispatcher: Option<Arc<dyn ChunkDispatcher>>,
    cache: Option<Arc<dyn CacheStore>>,
}

impl RiskEngineBuilder {
    /// Uses `dispatcher` instead of a fresh worker pool.
    pub fn dispatcher(mut self, dispatcher: Arc<dyn ChunkDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Uses `cache` instead of an [`InMemoryCache`].
    ///
    /// Ignored when caching is disabled in the configuration.
    pub fn cache_store(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Config` if the configuration is invalid or the
    /// worker pool cannot be started.
    pub fn build(self) -> Result<RiskEngine, EngineError> {
        let config = self.config;
        config.validate()?;

        let dispatcher: Arc<dyn ChunkDispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(WorkerPool::new(config.workers)?),
        };
        let simulator = MonteCarloSimulator::new(dispatcher, config.simulation_config()?);
        let calculator = RiskMetricsCalculator::new(config.confidence_levels.clone()).map_err(
            |e| ConfigError::InvalidValue {
                name: "confidence_levels",
                reason: e.to_string(),
            },
        )?;

        let cache = config.cache_enabled.then(|| {
            self.cache
                .unwrap_or_else(|| Arc::new(InMemoryCache::new()) as Arc<dyn CacheStore>)
        });

        tracing::info!(
            workers = simulator.concurrency(),
            cache_enabled = cache.is_some(),
            cache_ttl_secs = config.cache_ttl_secs,
            timeout_ms = config.timeout_ms,
            scheme = %config.sampling_scheme,
            "risk engine ready"
        );

        Ok(RiskEngine {
            simulator,
            calculator,
            cache,
            config,
            in_flight: Mutex::new(HashMap::new()),
            counters: CacheCounters::default(),
            computations: AtomicU64::new(0),
        })
    }
}
