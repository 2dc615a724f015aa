//! Simulation kernel configuration.
//!
//! This module provides the declared sampling scheme and trajectory
//! retention mode. The two are validated together so an ensemble is never
//! produced by a silent mix of terminal-only and full-path generation.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Maximum number of full trajectories that may be retained per request.
pub const MAX_TRAJECTORY_SAMPLE: usize = 1_000;

/// How the diffusion accumulator `W` of each path is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingScheme {
    /// One scaled normal shock per trading day, summed.
    ///
    /// Required for trajectory retention.
    #[default]
    Stepwise,

    /// `W ~ N(0, T)` drawn directly from its closed-form distribution.
    ///
    /// One normal per path; intermediate prices are never formed.
    Exact,
}

impl std::fmt::Display for SamplingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SamplingScheme::Stepwise => write!(f, "stepwise"),
            SamplingScheme::Exact => write!(f, "exact"),
        }
    }
}

/// Immutable simulation kernel configuration.
///
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use risk_simulation::config::{SamplingScheme, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .scheme(SamplingScheme::Stepwise)
///     .trajectory_sample(50)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.trajectory_sample(), 50);
/// assert_eq!(config.seed(), Some(42));
///
/// // Trajectories cannot be retained by the exact scheme
/// assert!(SimulationConfig::builder()
///     .scheme(SamplingScheme::Exact)
///     .trajectory_sample(10)
///     .build()
///     .is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationConfig {
    scheme: SamplingScheme,
    trajectory_sample: usize,
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns the sampling scheme.
    #[inline]
    pub fn scheme(&self) -> SamplingScheme {
        self.scheme
    }

    /// Number of full trajectories retained per request (0 = off).
    #[inline]
    pub fn trajectory_sample(&self) -> usize {
        self.trajectory_sample
    }

    /// Optional base seed for reproducible runs.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if:
    /// - trajectories are requested together with [`SamplingScheme::Exact`]
    /// - `trajectory_sample` exceeds [`MAX_TRAJECTORY_SAMPLE`]
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.trajectory_sample > 0 && self.scheme == SamplingScheme::Exact {
            return Err(SimulationError::InvalidConfig {
                name: "trajectory_sample",
                value: "trajectory retention requires the stepwise scheme".to_string(),
            });
        }
        if self.trajectory_sample > MAX_TRAJECTORY_SAMPLE {
            return Err(SimulationError::InvalidConfig {
                name: "trajectory_sample",
                value: format!(
                    "{} exceeds the maximum of {}",
                    self.trajectory_sample, MAX_TRAJECTORY_SAMPLE
                ),
            });
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    scheme: SamplingScheme,
    trajectory_sample: usize,
    seed: Option<u64>,
}

impl SimulationConfigBuilder {
    /// Sets the sampling scheme.
    #[inline]
    pub fn scheme(mut self, scheme: SamplingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the number of trajectories to retain.
    #[inline]
    pub fn trajectory_sample(mut self, count: usize) -> Self {
        self.trajectory_sample = count;
        self
    }

    /// Sets the base seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the base seed.
    #[inline]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::validate`].
    pub fn build(self) -> Result<SimulationConfig, SimulationError> {
        let config = SimulationConfig {
            scheme: self.scheme,
            trajectory_sample: self.trajectory_sample,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
