//! Stress scenarios.
//!
//! - [`StressScenario::PriceShock`] applies an instantaneous relative price
//!   drop with no simulation.
//! - [`StressScenario::VolShock`] scales volatility by `1 + s` and re-runs
//!   the (cached) simulation.

use risk_core::{RiskSummary, SimulationRequest};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A stress scenario applied to a simulation request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario_type", content = "shock_value", rename_all = "snake_case")]
pub enum StressScenario {
    /// Relative price drop `s ∈ [0, 1]`.
    PriceShock(f64),
    /// Relative volatility increase `s > −1`.
    VolShock(f64),
}

impl StressScenario {
    /// Validates the shock magnitude.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidScenario` for a non-finite shock, a price
    /// shock outside `[0, 1]` or a vol shock `≤ −1`.
    pub fn validate(&self) -> Result<(), EngineError> {
        match *self {
            StressScenario::PriceShock(s) if !(0.0..=1.0).contains(&s) => Err(
                EngineError::InvalidScenario(format!("price shock {s} must be in [0, 1]")),
            ),
            StressScenario::VolShock(s) if !s.is_finite() || s <= -1.0 => Err(
                EngineError::InvalidScenario(format!("vol shock {s} must be finite and > -1")),
            ),
            _ => Ok(()),
        }
    }

    /// Shock magnitude.
    pub fn shock(&self) -> f64 {
        match *self {
            StressScenario::PriceShock(s) | StressScenario::VolShock(s) => s,
        }
    }

    /// Request with stressed volatility, for vol shocks.
    pub(crate) fn stressed_request(&self, request: &SimulationRequest) -> SimulationRequest {
        match *self {
            StressScenario::PriceShock(_) => request.clone(),
            StressScenario::VolShock(s) => request.with_volatility(request.volatility * (1.0 + s)),
        }
    }
}

/// Result of a stress scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "scenario_type", rename_all = "snake_case")]
pub enum StressOutcome {
    /// Instantaneous price drop.
    PriceShock {
        /// Applied shock.
        shock_value: f64,
        /// `S₀ · (1 − s)`.
        new_price: f64,
        /// `S₀ · s`.
        estimated_loss: f64,
    },
    /// Re-simulation under stressed volatility.
    VolShock {
        /// Applied shock.
        shock_value: f64,
        /// `σ · (1 + s)`.
        stressed_volatility: f64,
        /// Summary of the stressed simulation.
        summary: RiskSummary,
    },
}

/// Evaluates a price shock.
pub(crate) fn price_shock(request: &SimulationRequest, shock: f64) -> StressOutcome {
    StressOutcome::PriceShock {
        shock_value: shock,
        new_price: request.initial_price * (1.0 - shock),
        estimated_loss: request.initial_price * shock,
    }
}
