//! Ensemble aggregation.
//!
//! Chunk outputs are concatenated in chunk order into a single ensemble of
//! terminal prices. Statistics computed downstream do not depend on the
//! order, but a fixed order keeps seeded runs reproducible.

use crate::error::SimulationError;
use crate::gbm::{ChunkOutput, TrajectorySample};

/// Full collection of terminal prices for one simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Ensemble {
    prices: Vec<f64>,
}

impl Ensemble {
    /// Terminal prices.
    #[inline]
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of terminal prices.
    #[inline]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the ensemble holds no price.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Concatenates chunk outputs into one ensemble plus the merged trajectory
/// sample.
///
/// # Errors
///
/// Returns `SimulationError::EnsembleLengthMismatch` if the total number of
/// prices differs from `expected`.
pub fn aggregate(
    mut outputs: Vec<ChunkOutput>,
    expected: usize,
) -> Result<(Ensemble, Option<TrajectorySample>), SimulationError> {
    outputs.sort_by_key(|o| o.chunk);

    let actual: usize = outputs.iter().map(|o| o.terminal_prices.len()).sum();
    if actual != expected {
        return Err(SimulationError::EnsembleLengthMismatch { expected, actual });
    }

    let mut prices = Vec::with_capacity(expected);
    let mut trajectories: Option<TrajectorySample> = None;
    for output in outputs {
        prices.extend(output.terminal_prices);
        if let Some(sample) = output.trajectories {
            match trajectories.as_mut() {
                Some(merged) => merged.append(sample),
                None => trajectories = Some(sample),
            }
        }
    }

    Ok((Ensemble { prices }, trajectories))
}
