//! Engine configuration.
//!
//! [`EngineConfig`] deserialises from a TOML `[engine]` table with every
//! field optional, or is assembled with [`EngineConfigBuilder`].

use std::time::Duration;

use risk_core::ConfidenceLevel;
use risk_simulation::{SamplingScheme, SimulationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("Invalid engine setting '{name}': {reason}")]
    InvalidValue {
        /// Field name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Risk engine configuration.
///
/// # Examples
///
/// ```rust
/// use risk_engine::EngineConfig;
///
/// let config: EngineConfig = toml::from_str(r#"
///     workers = 4
///     cache_ttl_secs = 600
///     confidence_levels = [0.9, 0.99]
/// "#).unwrap();
///
/// assert_eq!(config.workers, 4);
/// assert_eq!(config.timeout_ms, 60_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads, which is also the number of chunks per request.
    pub workers: usize,
    /// Lifetime of a cached result in seconds.
    pub cache_ttl_secs: u64,
    /// Whether results are cached at all.
    pub cache_enabled: bool,
    /// Wall-clock limit per computation in milliseconds.
    pub timeout_ms: u64,
    /// Confidence levels reported for every request.
    pub confidence_levels: Vec<ConfidenceLevel>,
    /// How diffusion increments are drawn.
    pub sampling_scheme: SamplingScheme,
    /// Number of full trajectories retained per request (0 = off).
    pub trajectory_sample: usize,
    /// Base seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            cache_ttl_secs: 3600,
            cache_enabled: true,
            timeout_ms: 60_000,
            confidence_levels: default_levels(),
            sampling_scheme: SamplingScheme::Stepwise,
            trajectory_sample: 0,
            seed: None,
        }
    }
}

fn default_levels() -> Vec<ConfidenceLevel> {
    [0.95, 0.99]
        .into_iter()
        .filter_map(|c| ConfidenceLevel::new(c).ok())
        .collect()
}

impl EngineConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Cache entry lifetime.
    #[inline]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Computation timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Kernel configuration derived from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the scheme and trajectory
    /// settings are inconsistent.
    pub fn simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        SimulationConfig::builder()
            .scheme(self.sampling_scheme)
            .trajectory_sample(self.trajectory_sample)
            .maybe_seed(self.seed)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                name: "trajectory_sample",
                reason: e.to_string(),
            })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `workers` is 0
    /// - `timeout_ms` is 0
    /// - `cache_ttl_secs` is 0 while caching is enabled
    /// - `confidence_levels` is empty
    /// - the sampling settings are inconsistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be positive"));
        }
        if self.cache_enabled && self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be positive when caching"));
        }
        if self.confidence_levels.is_empty() {
            return Err(invalid("confidence_levels", "at least one level required"));
        }
        self.simulation_config()?;
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        reason: reason.to_string(),
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Sets the worker count.
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Sets the cache TTL in seconds.
    pub fn cache_ttl_secs(mut self, secs: u64) -> Self {
        self.config.cache_ttl_secs = secs;
        self
    }

    /// Enables or disables caching.
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    /// Sets the computation timeout in milliseconds.
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Sets the reported confidence levels.
    pub fn confidence_levels(mut self, levels: Vec<ConfidenceLevel>) -> Self {
        self.config.confidence_levels = levels;
        self
    }

    /// Sets the sampling scheme.
    pub fn sampling_scheme(mut self, scheme: SamplingScheme) -> Self {
        self.config.sampling_scheme = scheme;
        self
    }

    /// Sets the number of retained trajectories.
    pub fn trajectory_sample(mut self, count: usize) -> Self {
        self.config.trajectory_sample = count;
        self
    }

    /// Sets the base seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// See [`EngineConfig::validate`].
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.workers >= 1);
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert!(config.cache_enabled);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        let levels: Vec<f64> = config.confidence_levels.iter().map(|l| l.value()).collect();
        assert_eq!(levels, vec![0.95, 0.99]);
        assert_eq!(config.sampling_scheme, SamplingScheme::Stepwise);
        assert_eq!(config.trajectory_sample, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validates() {
        assert!(EngineConfig::builder().workers(0).build().is_err());
        assert!(EngineConfig::builder().timeout_ms(0).build().is_err());
        assert!(EngineConfig::builder()
            .confidence_levels(vec![])
            .build()
            .is_err());
        assert!(EngineConfig::builder()
            .sampling_scheme(SamplingScheme::Exact)
            .trajectory_sample(5)
            .build()
            .is_err());
    }

    #[test]
    fn test_zero_ttl_allowed_without_cache() {
        assert!(EngineConfig::builder().cache_ttl_secs(0).build().is_err());
        assert!(EngineConfig::builder()
            .cache_enabled(false)
            .cache_ttl_secs(0)
            .build()
            .is_ok());
    }

    #[test]
    fn test_simulation_config_mapping() {
        let config = EngineConfig::builder()
            .sampling_scheme(SamplingScheme::Stepwise)
            .trajectory_sample(20)
            .seed(9)
            .build()
            .unwrap();
        let sim = config.simulation_config().unwrap();
        assert_eq!(sim.trajectory_sample(), 20);
        assert_eq!(sim.seed(), Some(9));
    }

    #[test]
    fn test_toml_rejects_bad_level() {
        let result: Result<EngineConfig, _> = toml::from_str("confidence_levels = [1.5]");
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_scheme() {
        let config: EngineConfig = toml::from_str(r#"sampling_scheme = "exact""#).unwrap();
        assert_eq!(config.sampling_scheme, SamplingScheme::Exact);
        assert_eq!(config.cache_ttl_secs, 3600);
    }
}
