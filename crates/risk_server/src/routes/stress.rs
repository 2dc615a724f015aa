//! Stress test endpoint
//!
//! `POST /api/v1/stress-test` applies a price or volatility shock to a
//! simulation request.

use axum::{extract::State, response::Json, routing::post, Router};
use risk_core::SimulationRequest;
use risk_engine::{StressOutcome, StressScenario};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiJson};
use super::simulate::{
    default_drift, default_horizon_days, default_initial_price, default_path_count,
    default_volatility,
};
use super::AppState;

/// Kind of stress scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    /// Instantaneous relative price drop
    PriceShock,
    /// Relative volatility increase
    VolShock,
}

/// Stress test request body
#[derive(Debug, Clone, Deserialize)]
pub struct StressBody {
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
    /// Scenario kind
    pub scenario_type: ScenarioType,
    /// Shock magnitude
    pub shock_value: f64,
}

impl StressBody {
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

    fn scenario(&self) -> StressScenario {
        match self.scenario_type {
            ScenarioType::PriceShock => StressScenario::PriceShock(self.shock_value),
            ScenarioType::VolShock => StressScenario::VolShock(self.shock_value),
        }
    }
}

/// Stress test response
#[derive(Debug, Clone, Serialize)]
pub struct StressResponse {
    /// Asset identifier echoed back
    pub asset_id: String,
    /// Scenario result
    #[serde(flatten)]
    pub outcome: StressOutcome,
}

/// Build the stress test routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/stress-test", post(stress_handler))
}

/// POST /api/v1/stress-test
async fn stress_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StressBody>,
) -> Result<Json<StressResponse>, ApiError> {
    let outcome = state
        .engine
        .run_stress_test(&body.to_request(), body.scenario())
        .await?;

    Ok(Json(StressResponse {
        asset_id: body.asset_id,
        outcome,
    }))
}
