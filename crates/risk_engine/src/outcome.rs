//! Result of one completed simulation.

use risk_core::RiskSummary;
use risk_simulation::TrajectorySample;
use serde::Serialize;

/// Risk summary plus the optional trajectory sample.
///
/// This is what the cache stores; callers share it through an `Arc`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Mean price and per-level VaR/CVaR.
    pub summary: RiskSummary,
    /// Retained full trajectories, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectories: Option<TrajectorySample>,
}
