//! Monte Carlo simulation endpoint
//!
//! `POST /api/v1/simulate` runs (or serves from cache) a GBM simulation and
//! returns the mean terminal price with VaR/CVaR per configured level.

use axum::{extract::State, response::Json, routing::post, Router};
use risk_core::{LevelRisk, SimulationRequest};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiJson};
use super::AppState;

pub(crate) fn default_initial_price() -> f64 {
    100.0
}

pub(crate) fn default_horizon_days() -> u32 {
    252
}

pub(crate) fn default_path_count() -> usize {
    10_000
}

pub(crate) fn default_volatility() -> f64 {
    0.20
}

pub(crate) fn default_drift() -> f64 {
    0.05
}

/// Simulation request body
///
/// Model fields fall back to one year of daily steps, 10 000 paths,
/// 20% volatility and 5% drift.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateBody {
    /// Asset identifier
    #[serde(alias = "ticker")]
    pub asset_id: String,
    /// Initial price
    #[serde(default = "default_initial_price")]
    pub initial_price: f64,
    /// Horizon in trading days
    #[serde(default = "default_horizon_days", alias = "days")]
    pub horizon_days: u32,
    /// Number of paths
    #[serde(default = "default_path_count", alias = "paths")]
    pub path_count: usize,
    /// Annualised volatility
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    /// Annualised drift
    #[serde(default = "default_drift")]
    pub drift: f64,
    /// Whether to return the retained trajectory sample
    #[serde(default)]
    pub include_paths: bool,
}

impl SimulateBody {
    fn to_request(&self) -> SimulationRequest {
        SimulationRequest::new(
            self.asset_id.clone(),
            self.initial_price,
            self.volatility,
            self.drift,
            self.horizon_days,
            self.path_count,
        )
    }
}

/// Simulation response
#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    /// Asset identifier echoed back
    pub asset_id: String,
    /// Mean terminal price
    pub mean_price: f64,
    /// VaR/CVaR per confidence level, ascending
    pub levels: Vec<LevelRisk>,
    /// Retained price paths, each starting at the initial price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectories: Option<Vec<Vec<f64>>>,
}

/// Build the simulation routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/simulate", post(simulate_handler))
}

/// POST /api/v1/simulate
async fn simulate_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SimulateBody>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let request = body.to_request();
    let outcome = state.engine.run_simulation_with_paths(&request).await?;

    let trajectories = if body.include_paths {
        outcome
            .trajectories
            .as_ref()
            .map(|sample| sample.paths().map(<[f64]>::to_vec).collect())
    } else {
        None
    };

    Ok(Json(SimulateResponse {
        asset_id: body.asset_id,
        mean_price: outcome.summary.mean_price(),
        levels: outcome.summary.levels().to_vec(),
        trajectories,
    }))
}
