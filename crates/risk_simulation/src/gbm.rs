//! Geometric Brownian Motion terminal-price generation.
//!
//! Each path accumulates `steps = T / dt` standard-normal shocks scaled by
//! `√dt` (dt = 1/252) into a diffusion accumulator `W`, then
//!
//! ```text
//! drift_term     = (μ − 0.5σ²)·T
//! terminal_price = S₀ · exp(drift_term + σ·W)
//! ```
//!
//! which is the exact terminal distribution of GBM. Under
//! [`SamplingScheme::Exact`] `W` is drawn directly as `√T · Z`.
//!
//! # Memory Layout
//!
//! Retained trajectories are stored row-major:
//! `data[path_idx * (n_steps + 1) + step_idx]`, with `step_idx = 0` holding S₀.

use risk_core::{SimulationRequest, TRADING_DAYS_PER_YEAR};
use serde::Serialize;

use crate::config::SamplingScheme;
use crate::dispatch::CancelFlag;
use crate::error::SimulationError;
use crate::partition::ChunkTask;
use crate::rng::SimRng;

/// Time step in years (one trading day).
pub const DT: f64 = 1.0 / TRADING_DAYS_PER_YEAR;

/// Parameters for GBM path generation.
///
/// # Examples
///
/// ```rust
/// use risk_core::SimulationRequest;
/// use risk_simulation::gbm::GbmParams;
///
/// let request = SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 252, 1_000);
/// let params = GbmParams::from_request(&request);
/// assert_eq!(params.n_steps, 252);
/// assert_eq!(params.horizon_years, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GbmParams {
    /// Initial price (S₀).
    pub spot: f64,
    /// Drift (μ) - annualised.
    pub drift: f64,
    /// Volatility (σ) - annualised.
    pub volatility: f64,
    /// Horizon (T) - in years.
    pub horizon_years: f64,
    /// Number of daily steps (`T / dt`).
    pub n_steps: usize,
}

impl GbmParams {
    /// Extracts model parameters from a request.
    pub fn from_request(request: &SimulationRequest) -> Self {
        Self {
            spot: request.initial_price,
            drift: request.drift,
            volatility: request.volatility,
            horizon_years: request.horizon_years(),
            n_steps: request.horizon_days as usize,
        }
    }

    /// Itô-corrected drift over the whole horizon, `(μ − 0.5σ²)·T`.
    #[inline]
    pub fn drift_term(&self) -> f64 {
        (self.drift - 0.5 * self.volatility * self.volatility) * self.horizon_years
    }
}

/// Bounded sample of full step-by-step price paths.
///
/// Each path has `n_steps + 1` points starting at S₀; the last point equals
/// the corresponding terminal price in the ensemble.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectorySample {
    n_steps: usize,
    data: Vec<f64>,
}

impl TrajectorySample {
    /// Creates an empty sample for paths of `n_steps` steps.
    pub fn with_capacity(n_steps: usize, n_paths: usize) -> Self {
        Self {
            n_steps,
            data: Vec::with_capacity(n_paths * (n_steps + 1)),
        }
    }

    /// Number of steps per path.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of retained paths.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / (self.n_steps + 1)
    }

    /// Whether no path is retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn path(&self, idx: usize) -> &[f64] {
        let width = self.n_steps + 1;
        &self.data[idx * width..(idx + 1) * width]
    }

    /// Iterates over retained paths.
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_steps + 1)
    }

    #[cfg(test)]
    pub(crate) fn append_path(&mut self, path: &[f64]) {
        assert_eq!(path.len(), self.n_steps + 1, "path length mismatch");
        self.data.extend_from_slice(path);
    }

    /// Appends all paths of `other`.
    ///
    /// Both samples must share the same step count.
    pub fn append(&mut self, other: TrajectorySample) {
        debug_assert_eq!(self.n_steps, other.n_steps);
        self.data.extend(other.data);
    }
}

/// Output of one chunk.
#[derive(Clone, Debug)]
pub struct ChunkOutput {
    /// Index of the chunk that produced this output.
    pub chunk: usize,
    /// One terminal price per path of the chunk.
    pub terminal_prices: Vec<f64>,
    /// Full trajectories of the chunk's first paths, when retention applies.
    pub trajectories: Option<TrajectorySample>,
}

/// Simulates one chunk of independent GBM paths.
///
/// The cancellation flag is polled between paths.
///
/// # Errors
///
/// - `SimulationError::Cancelled` once `cancel` is raised
/// - `SimulationError::NonFinitePrice` on numerical overflow
pub fn simulate_chunk(
    task: &ChunkTask,
    cancel: &CancelFlag,
) -> Result<ChunkOutput, SimulationError> {
    let params = task.params;
    let mut rng = SimRng::from_seed(task.seed);

    let drift_term = params.drift_term();
    let sqrt_dt = DT.sqrt();
    let sqrt_t = params.horizon_years.sqrt();

    let mut terminal_prices = Vec::with_capacity(task.path_count);
    let mut trajectories = (task.retain_paths > 0)
        .then(|| TrajectorySample::with_capacity(params.n_steps, task.retain_paths));

    for path_idx in 0..task.path_count {
        if cancel.is_cancelled() {
            return Err(SimulationError::Cancelled);
        }

        let w = match (task.scheme, trajectories.as_mut()) {
            (SamplingScheme::Exact, _) => sqrt_t * rng.gen_normal(),
            (SamplingScheme::Stepwise, Some(sample)) if path_idx < task.retain_paths => {
                accumulate_recording(&mut rng, &params, sqrt_dt, drift_term, &mut sample.data)
            }
            (SamplingScheme::Stepwise, _) => accumulate(&mut rng, params.n_steps, sqrt_dt),
        };

        let terminal = params.spot * (drift_term + params.volatility * w).exp();
        if !terminal.is_finite() {
            return Err(SimulationError::NonFinitePrice {
                chunk: task.index,
                value: terminal,
            });
        }
        terminal_prices.push(terminal);
    }

    Ok(ChunkOutput {
        chunk: task.index,
        terminal_prices,
        trajectories,
    })
}

/// Sums `n_steps` shocks `√dt · Z`.
#[inline]
fn accumulate(rng: &mut SimRng, n_steps: usize, sqrt_dt: f64) -> f64 {
    let mut w = 0.0;
    for _ in 0..n_steps {
        w += sqrt_dt * rng.gen_normal();
    }
    w
}

/// Same as [`accumulate`], additionally writing `S_t` for every step.
///
/// `S_t = S₀ · exp(drift_term · t/n + σ·W_t)`, so the last point is
/// bit-identical to the terminal price computed from the returned `W`.
fn accumulate_recording(
    rng: &mut SimRng,
    params: &GbmParams,
    sqrt_dt: f64,
    drift_term: f64,
    out: &mut Vec<f64>,
) -> f64 {
    let n = params.n_steps;
    let mut w = 0.0;
    out.push(params.spot);
    for step in 1..=n {
        w += sqrt_dt * rng.gen_normal();
        let fraction = step as f64 / n as f64;
        out.push(params.spot * (drift_term * fraction + params.volatility * w).exp());
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn task(
        path_count: usize,
        scheme: SamplingScheme,
        retain_paths: usize,
        seed: u64,
    ) -> ChunkTask {
        let request = SimulationRequest::new("TEST", 100.0, 0.2, 0.05, 252, path_count);
        ChunkTask {
            index: 0,
            params: GbmParams::from_request(&request),
            path_count,
            seed,
            scheme,
            retain_paths,
        }
    }

    fn run(t: ChunkTask) -> Result<ChunkOutput, SimulationError> {
        simulate_chunk(&t, &CancelFlag::new())
    }

    #[test]
    fn test_drift_term() {
        let request = SimulationRequest::new("TEST", 100.0, 0.2, 0.05, 252, 1);
        let params = GbmParams::from_request(&request);
        assert_relative_eq!(params.drift_term(), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_chunk_length_and_positivity() {
        let out = run(task(500, SamplingScheme::Stepwise, 0, 1)).unwrap();
        assert_eq!(out.terminal_prices.len(), 500);
        assert!(out.trajectories.is_none());
        for &price in &out.terminal_prices {
            assert!(price > 0.0 && price.is_finite());
        }
    }

    #[test]
    fn test_reproducibility() {
        let a = run(task(100, SamplingScheme::Stepwise, 0, 9)).unwrap();
        let b = run(task(100, SamplingScheme::Stepwise, 0, 9)).unwrap();
        assert_eq!(a.terminal_prices, b.terminal_prices);

        let c = run(task(100, SamplingScheme::Stepwise, 0, 10)).unwrap();
        assert_ne!(a.terminal_prices, c.terminal_prices);
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let mut t = task(10, SamplingScheme::Stepwise, 0, 3);
        t.params.volatility = 0.0;
        let out = simulate_chunk(&t, &CancelFlag::new()).unwrap();
        let expected = 100.0 * 0.05_f64.exp();
        for &price in &out.terminal_prices {
            assert_relative_eq!(price, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_statistical_mean_both_schemes() {
        // E[S(T)] = S(0) * exp(μT)
        let expected = 100.0 * 0.05_f64.exp();
        for scheme in [SamplingScheme::Stepwise, SamplingScheme::Exact] {
            let out = run(task(20_000, scheme, 0, 42)).unwrap();
            let mean = out.terminal_prices.iter().sum::<f64>() / 20_000.0;
            assert_relative_eq!(mean, expected, max_relative = 0.02);
        }
    }

    #[test]
    fn test_trajectory_retention() {
        let out = run(task(100, SamplingScheme::Stepwise, 5, 11)).unwrap();
        let sample = out.trajectories.expect("trajectories retained");
        assert_eq!(sample.len(), 5);
        assert_eq!(sample.n_steps(), 252);

        for (idx, path) in sample.paths().enumerate() {
            assert_eq!(path.len(), 253);
            assert_eq!(path[0], 100.0);
            assert_eq!(path[252], out.terminal_prices[idx]);
        }
    }

    #[test]
    fn test_retention_does_not_change_terminal_prices() {
        let plain = run(task(50, SamplingScheme::Stepwise, 0, 5)).unwrap();
        let kept = run(task(50, SamplingScheme::Stepwise, 10, 5)).unwrap();
        for (a, b) in plain.terminal_prices.iter().zip(&kept.terminal_prices) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_cancelled_chunk_stops() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = simulate_chunk(&task(10, SamplingScheme::Stepwise, 0, 1), &cancel);
        assert_eq!(result.unwrap_err(), SimulationError::Cancelled);
    }

    #[test]
    fn test_overflow_reported() {
        let mut t = task(10, SamplingScheme::Exact, 0, 1);
        t.params.spot = 1e300;
        t.params.drift = 1_000.0;
        t.params.volatility = 0.0;
        let result = simulate_chunk(&t, &CancelFlag::new());
        assert!(matches!(
            result,
            Err(SimulationError::NonFinitePrice { chunk: 0, .. })
        ));
    }

    #[test]
    fn test_sample_append() {
        let mut a = TrajectorySample::with_capacity(2, 1);
        a.append_path(&[1.0, 2.0, 3.0]);
        let mut b = TrajectorySample::with_capacity(2, 1);
        b.append_path(&[4.0, 5.0, 6.0]);
        a.append(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.path(1), &[4.0, 5.0, 6.0]);
    }
}
