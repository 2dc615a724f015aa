//! Simulation request.
//!
//! A [`SimulationRequest`] fully determines one Monte Carlo run: the asset,
//! the GBM parameters, the horizon and the number of paths. Requests are
//! validated before any work is dispatched.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Trading-day convention: one simulated time step is `1 / 252` years.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Maximum number of simulation paths allowed in one request.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum horizon (and therefore step count) in trading days.
pub const MAX_HORIZON_DAYS: u32 = 10_000;

/// Parameters of one tail-risk simulation.
///
/// # Model
///
/// Terminal prices follow geometric Brownian motion:
/// ```text
/// dS = μ S dt + σ S dW
/// ```
///
/// # Examples
///
/// ```rust
/// use risk_core::types::SimulationRequest;
///
/// let request = SimulationRequest::new("MSFT", 310.0, 0.25, 0.07, 10, 5_000);
/// assert!(request.validate().is_ok());
///
/// let bad = SimulationRequest::new("MSFT", 310.0, 0.25, 0.07, 10, 0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Opaque asset identifier (ticker, ISIN, ...).
    pub asset_id: String,
    /// Initial price S₀; must be positive.
    pub initial_price: f64,
    /// Annualised volatility σ; must be non-negative.
    pub volatility: f64,
    /// Annualised drift μ.
    pub drift: f64,
    /// Horizon in trading days; one step per day.
    pub horizon_days: u32,
    /// Number of simulated paths.
    pub path_count: usize,
}

impl SimulationRequest {
    /// Creates a new request.
    ///
    /// # Arguments
    ///
    /// * `asset_id` - Opaque asset identifier
    /// * `initial_price` - Initial price S₀
    /// * `volatility` - Annualised volatility σ
    /// * `drift` - Annualised drift μ
    /// * `horizon_days` - Horizon in trading days
    /// * `path_count` - Number of paths
    pub fn new(
        asset_id: impl Into<String>,
        initial_price: f64,
        volatility: f64,
        drift: f64,
        horizon_days: u32,
        path_count: usize,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            initial_price,
            volatility,
            drift,
            horizon_days,
            path_count,
        }
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `path_count` is 0 or greater than [`MAX_PATHS`]
    /// - `horizon_days` is 0 or greater than [`MAX_HORIZON_DAYS`]
    /// - `initial_price` is not positive and finite
    /// - `volatility` is negative or not finite
    /// - `drift` is not finite
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path_count == 0 || self.path_count > MAX_PATHS {
            return Err(ValidationError::InvalidPathCount(self.path_count));
        }
        if self.horizon_days == 0 || self.horizon_days > MAX_HORIZON_DAYS {
            return Err(ValidationError::InvalidHorizon(self.horizon_days));
        }
        if !(self.initial_price > 0.0 && self.initial_price.is_finite()) {
            return Err(ValidationError::InvalidInitialPrice(self.initial_price));
        }
        if !(self.volatility >= 0.0 && self.volatility.is_finite()) {
            return Err(ValidationError::InvalidVolatility(self.volatility));
        }
        if !self.drift.is_finite() {
            return Err(ValidationError::InvalidDrift(self.drift));
        }
        Ok(())
    }

    /// Horizon T in years (`horizon_days / 252`).
    #[inline]
    pub fn horizon_years(&self) -> f64 {
        self.horizon_days as f64 / TRADING_DAYS_PER_YEAR
    }

    /// Returns a copy of this request with a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self {
            volatility,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationRequest {
        SimulationRequest::new("AAPL", 100.0, 0.2, 0.05, 252, 10_000)
    }

    #[test]
    fn test_valid_request() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_paths_rejected() {
        let req = SimulationRequest {
            path_count: 0,
            ..base()
        };
        assert_eq!(req.validate(), Err(ValidationError::InvalidPathCount(0)));
    }

    #[test]
    fn test_too_many_paths_rejected() {
        let req = SimulationRequest {
            path_count: MAX_PATHS + 1,
            ..base()
        };
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvalidPathCount(_))
        ));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let req = SimulationRequest {
            horizon_days: 0,
            ..base()
        };
        assert_eq!(req.validate(), Err(ValidationError::InvalidHorizon(0)));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        for price in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let req = SimulationRequest {
                initial_price: price,
                ..base()
            };
            assert!(matches!(
                req.validate(),
                Err(ValidationError::InvalidInitialPrice(_))
            ));
        }
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let req = base().with_volatility(-0.1);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvalidVolatility(_))
        ));
    }

    #[test]
    fn test_zero_volatility_allowed() {
        assert!(base().with_volatility(0.0).validate().is_ok());
    }

    #[test]
    fn test_nan_drift_rejected() {
        let req = SimulationRequest {
            drift: f64::NAN,
            ..base()
        };
        assert!(matches!(
            req.validate(),
            Err(ValidationError::InvalidDrift(_))
        ));
    }

    #[test]
    fn test_horizon_years() {
        assert_eq!(base().horizon_years(), 1.0);
        let req = SimulationRequest {
            horizon_days: 126,
            ..base()
        };
        assert_eq!(req.horizon_years(), 0.5);
    }

    #[test]
    fn test_with_volatility_keeps_other_fields() {
        let req = base().with_volatility(0.4);
        assert_eq!(req.volatility, 0.4);
        assert_eq!(req.asset_id, "AAPL");
        assert_eq!(req.path_count, 10_000);
    }
}
