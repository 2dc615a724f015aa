//! Confidence levels and risk summaries.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// A confidence level strictly inside (0, 1).
///
/// Deserialisation goes through [`ConfidenceLevel::new`], so a level read
/// from configuration is always valid.
///
/// # Examples
///
/// ```rust
/// use risk_core::types::ConfidenceLevel;
///
/// let level = ConfidenceLevel::new(0.95).unwrap();
/// assert_eq!(level.value(), 0.95);
/// assert!(ConfidenceLevel::new(1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    /// Creates a confidence level.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfidenceLevel` unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidConfidenceLevel(value))
        }
    }

    /// Returns the level as a probability.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Probability mass of the loss tail, `1 - c`.
    #[inline]
    pub fn tail_probability(&self) -> f64 {
        1.0 - self.0
    }
}

impl TryFrom<f64> for ConfidenceLevel {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceLevel> for f64 {
    fn from(level: ConfidenceLevel) -> Self {
        level.0
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

/// VaR and CVaR at one confidence level.
///
/// Both figures are loss magnitudes and never negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRisk {
    /// Confidence level c.
    pub confidence: f64,
    /// Value-at-Risk at c.
    pub var: f64,
    /// Conditional Value-at-Risk (expected shortfall) at c.
    pub cvar: f64,
}

/// Immutable result of one simulation.
///
/// Holds the ensemble mean and one [`LevelRisk`] per confidence level,
/// sorted by ascending confidence.
///
/// # Examples
///
/// ```rust
/// use risk_core::types::{LevelRisk, RiskSummary};
///
/// let summary = RiskSummary::new(
///     105.0,
///     vec![
///         LevelRisk { confidence: 0.99, var: 35.0, cvar: 40.0 },
///         LevelRisk { confidence: 0.95, var: 25.0, cvar: 31.0 },
///     ],
/// );
/// assert_eq!(summary.levels()[0].confidence, 0.95);
/// assert_eq!(summary.var(0.99), Some(35.0));
/// assert_eq!(summary.cvar(0.90), None);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    mean_price: f64,
    levels: Vec<LevelRisk>,
}

impl RiskSummary {
    /// Creates a summary; levels are sorted by confidence.
    pub fn new(mean_price: f64, mut levels: Vec<LevelRisk>) -> Self {
        levels.sort_by(|a, b| a.confidence.total_cmp(&b.confidence));
        Self { mean_price, levels }
    }

    /// Mean terminal price of the ensemble.
    #[inline]
    pub fn mean_price(&self) -> f64 {
        self.mean_price
    }

    /// Per-level risk figures, ascending by confidence.
    #[inline]
    pub fn levels(&self) -> &[LevelRisk] {
        &self.levels
    }

    /// Looks up the figures for an exact confidence level.
    pub fn level(&self, confidence: f64) -> Option<&LevelRisk> {
        self.levels.iter().find(|l| l.confidence == confidence)
    }

    /// VaR at `confidence`, if that level was computed.
    pub fn var(&self, confidence: f64) -> Option<f64> {
        self.level(confidence).map(|l| l.var)
    }

    /// CVaR at `confidence`, if that level was computed.
    pub fn cvar(&self, confidence: f64) -> Option<f64> {
        self.level(confidence).map(|l| l.cvar)
    }
}
