//! VaR/CVaR calculator.

use risk_core::math::{mean, percentile_sorted, sort_ascending};
use risk_core::{ConfidenceLevel, LevelRisk, RiskSummary};

use crate::error::MetricsError;

/// Computes mean price and per-level VaR/CVaR over an ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskMetricsCalculator {
    levels: Vec<ConfidenceLevel>,
}

impl RiskMetricsCalculator {
    /// Creates a calculator for the given confidence levels.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::NoConfidenceLevels` if `levels` is empty.
    pub fn new(levels: Vec<ConfidenceLevel>) -> Result<Self, MetricsError> {
        if levels.is_empty() {
            return Err(MetricsError::NoConfidenceLevels);
        }
        Ok(Self { levels })
    }

    /// Computes the risk summary of `ensemble` relative to `initial_price`.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::EmptyEnsemble` if `ensemble` is empty.
    pub fn compute(
        &self,
        ensemble: &[f64],
        initial_price: f64,
    ) -> Result<RiskSummary, MetricsError> {
        // Summing in sorted order keeps the mean independent of path order
        let mut sorted = ensemble.to_vec();
        sort_ascending(&mut sorted);
        let mean_price = mean(&sorted).ok_or(MetricsError::EmptyEnsemble)?;

        // Subtracting a constant preserves the order
        let pnl: Vec<f64> = sorted.iter().map(|&p| p - initial_price).collect();

        let levels = self
            .levels
            .iter()
            .map(|&level| level_risk(&pnl, level))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RiskSummary::new(mean_price, levels))
    }
}

/// VaR and CVaR at one level over sorted P&L.
fn level_risk(sorted_pnl: &[f64], level: ConfidenceLevel) -> Result<LevelRisk, MetricsError> {
    let q = percentile_sorted(sorted_pnl, level.tail_probability())
        .ok_or(MetricsError::EmptyEnsemble)?;
    let var = (-q).max(0.0);

    let tail_len = sorted_pnl.partition_point(|&x| x <= q);
    let cvar = match mean(&sorted_pnl[..tail_len]) {
        // Rounding in the tail mean must not push CVaR below VaR
        Some(tail_mean) => (-tail_mean).max(0.0).max(var),
        None => 0.0,
    };

    Ok(LevelRisk {
        confidence: level.value(),
        var,
        cvar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn calculator(levels: &[f64]) -> RiskMetricsCalculator {
        let levels = levels
            .iter()
            .map(|&c| ConfidenceLevel::new(c).unwrap())
            .collect();
        RiskMetricsCalculator::new(levels).unwrap()
    }

    #[test]
    fn test_requires_levels() {
        assert_eq!(
            RiskMetricsCalculator::new(vec![]).unwrap_err(),
            MetricsError::NoConfidenceLevels
        );
    }

    #[test]
    fn test_empty_ensemble() {
        let result = calculator(&[0.95]).compute(&[], 100.0);
        assert_eq!(result.unwrap_err(), MetricsError::EmptyEnsemble);
    }

    #[test]
    fn test_known_values() {
        // Terminal prices 91..=100 against S0 = 100 give P&L -9..=0
        let ensemble: Vec<f64> = (91..=100).rev().map(f64::from).collect();
        let summary = calculator(&[0.9]).compute(&ensemble, 100.0).unwrap();

        // rank 0.1 * 9 = 0.9 between -9 and -8
        assert_relative_eq!(summary.var(0.9).unwrap(), 8.1, epsilon = 1e-12);
        // Tail {-9}
        assert_relative_eq!(summary.cvar(0.9).unwrap(), 9.0, epsilon = 1e-12);
        assert_relative_eq!(summary.mean_price(), 95.5, epsilon = 1e-12);
    }

    #[test]
    fn test_all_gain_ensemble_has_zero_risk() {
        let ensemble = vec![101.0, 105.0, 110.0, 120.0];
        let summary = calculator(&[0.95, 0.99]).compute(&ensemble, 100.0).unwrap();
        for level in summary.levels() {
            assert_eq!(level.var, 0.0);
            assert_eq!(level.cvar, 0.0);
        }
    }

    #[test]
    fn test_single_path() {
        let summary = calculator(&[0.95]).compute(&[90.0], 100.0).unwrap();
        assert_relative_eq!(summary.var(0.95).unwrap(), 10.0);
        assert_relative_eq!(summary.cvar(0.95).unwrap(), 10.0);
    }

    #[test]
    fn test_levels_reported_in_order() {
        let ensemble: Vec<f64> = (0..1000).map(|i| 50.0 + 0.1 * i as f64).collect();
        let summary = calculator(&[0.99, 0.9, 0.95]).compute(&ensemble, 100.0).unwrap();
        let confidences: Vec<f64> = summary.levels().iter().map(|l| l.confidence).collect();
        assert_eq!(confidences, vec![0.9, 0.95, 0.99]);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let ascending: Vec<f64> = (0..200).map(|i| 80.0 + 0.2 * i as f64).collect();
        let mut shuffled = ascending.clone();
        shuffled.reverse();
        shuffled.swap(3, 150);

        let calc = calculator(&[0.95, 0.99]);
        assert_eq!(
            calc.compute(&ascending, 100.0).unwrap(),
            calc.compute(&shuffled, 100.0).unwrap()
        );
    }
}
