//! Server configuration management
//!
//! Handles loading configuration from TOML files, environment variables, and CLI arguments.
//! Engine settings live in a nested `[engine]` table.

use risk_engine::EngineConfig;
use serde::de::value::StringDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid environment: {0}. Must be one of: development, staging, production")]
    InvalidEnvironment(String),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),

    #[error(transparent)]
    Engine(#[from] risk_engine::ConfigError),
}

/// Log verbosity, used as the default `EnvFilter` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive accepted by `tracing_subscriber::EnvFilter`
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s).ok_or_else(|| ConfigError::InvalidLogLevel(s.to_string()))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Deployment environment, reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "stage")]
    Staging,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s).ok_or_else(|| ConfigError::InvalidEnvironment(s.to_string()))
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive lookup of a unit variant by its serde name or alias
fn parse_name<T: DeserializeOwned>(s: &str) -> Option<T> {
    let name: StringDeserializer<serde::de::value::Error> = s.to_lowercase().into_deserializer();
    T::deserialize(name).ok()
}

/// Server configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level
    #[serde(deserialize_with = "case_insensitive")]
    pub log_level: LogLevel,
    /// Environment (development, staging, production)
    #[serde(deserialize_with = "case_insensitive")]
    pub environment: Environment,
    /// Time allowed for in-flight requests after a shutdown signal, in seconds
    pub shutdown_timeout_secs: u64,
    /// Interval between expired-entry sweeps of the result cache, in seconds
    pub cache_purge_interval_secs: u64,
    /// Risk engine settings
    pub engine: EngineConfig,
}

fn case_insensitive<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: LogLevel::Info,
            environment: Environment::Development,
            shutdown_timeout_secs: 30,
            cache_purge_interval_secs: 60,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `RISK_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from variables resolved by `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RISK_SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("RISK_SERVER_PORT") {
            self.port = parse_env("RISK_SERVER_PORT", &port)?;
        }
        if let Some(level) = lookup("RISK_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(env) = lookup("RISK_ENV") {
            self.environment = Environment::from_str(&env)?;
        }
        if let Some(secs) = lookup("RISK_SHUTDOWN_TIMEOUT_SECS") {
            self.shutdown_timeout_secs = parse_env("RISK_SHUTDOWN_TIMEOUT_SECS", &secs)?;
        }

        // Engine
        if let Some(workers) = lookup("RISK_WORKERS") {
            self.engine.workers = parse_env("RISK_WORKERS", &workers)?;
        }
        if let Some(ttl) = lookup("RISK_CACHE_TTL_SECS") {
            self.engine.cache_ttl_secs = parse_env("RISK_CACHE_TTL_SECS", &ttl)?;
        }
        if let Some(enabled) = lookup("RISK_CACHE_ENABLED") {
            self.engine.cache_enabled = parse_env("RISK_CACHE_ENABLED", &enabled.to_lowercase())?;
        }
        if let Some(ms) = lookup("RISK_TIMEOUT_MS") {
            self.engine.timeout_ms = parse_env("RISK_TIMEOUT_MS", &ms)?;
        }
        if let Some(seed) = lookup("RISK_SEED") {
            self.engine.seed = Some(parse_env("RISK_SEED", &seed)?);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        self.engine.validate()?;
        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Grace period for in-flight requests on shutdown
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Period of the cache sweep, `None` when sweeping is off
    pub fn cache_purge_interval(&self) -> Option<Duration> {
        (self.cache_purge_interval_secs > 0 && self.engine.cache_enabled)
            .then(|| Duration::from_secs(self.cache_purge_interval_secs))
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if let Some(workers) = cli.workers {
            self.engine.workers = workers;
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{key}={value} cannot be parsed")))
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Host address override
    pub host: Option<String>,
    /// Port override
    pub port: Option<u16>,
    /// Log level override
    pub log_level: Option<String>,
    /// Worker count override
    pub workers: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ServerConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// Same as [`build_config`] with an explicit environment lookup
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli)?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.shutdown_timeout_secs, 30);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.engine.cache_ttl_secs, 3600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::from_str("stage").unwrap(), Environment::Staging);
        assert_eq!(Environment::from_str("PROD").unwrap(), Environment::Production);
        assert!(Environment::from_str("invalid").is_err());
        assert_eq!(Environment::Staging.to_string(), "staging");
    }

    #[test]
    fn test_toml_names_are_case_insensitive() {
        let config = ServerConfig::from_toml(
            r#"
            log_level = "WARN"
            environment = "Prod"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.environment, Environment::Production);

        assert!(ServerConfig::from_toml(r#"environment = "qa""#).is_err());
    }

    #[test]
    fn test_validate_port() {
        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
        config.port = 65535;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_with_engine_table() {
        let config = ServerConfig::from_toml(
            r#"
            host = "127.0.0.1"
            port = 3000
            log_level = "debug"
            environment = "production"

            [engine]
            workers = 8
            cache_ttl_secs = 120
            timeout_ms = 5000
            confidence_levels = [0.9, 0.975]
            sampling_scheme = "exact"
            "#,
        )
        .unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:3000");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.engine.workers, 8);
        assert_eq!(config.engine.cache_ttl_secs, 120);
        assert_eq!(config.engine.timeout_ms, 5000);
        assert_eq!(config.engine.confidence_levels.len(), 2);
        assert!(config.engine.cache_enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ServerConfig::from_toml("port = 9000").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.engine.timeout_ms, 60_000);
    }

    #[test]
    fn test_toml_invalid_engine_rejected() {
        let result = ServerConfig::from_toml(
            r#"
            [engine]
            sampling_scheme = "exact"
            trajectory_sample = 10
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env_with(env(&[
                ("RISK_SERVER_PORT", "9100"),
                ("RISK_LOG_LEVEL", "warn"),
                ("RISK_WORKERS", "3"),
                ("RISK_CACHE_ENABLED", "FALSE"),
                ("RISK_SEED", "42"),
            ]))
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.engine.workers, 3);
        assert!(!config.engine.cache_enabled);
        assert_eq!(config.engine.seed, Some(42));
    }

    #[test]
    fn test_env_parse_error() {
        let mut config = ServerConfig::default();
        let result = config.apply_env_with(env(&[("RISK_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    }

    #[test]
    fn test_layering_precedence() {
        let dir = std::env::temp_dir().join(format!("risk_server_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("server.toml");
        std::fs::write(&path, "port = 7000\nhost = \"10.0.0.1\"\n[engine]\nworkers = 2\n").unwrap();

        let cli = CliArgs {
            config_file: Some(path.clone()),
            port: Some(7002),
            ..Default::default()
        };
        let config = build_config_with(
            &cli,
            env(&[("RISK_SERVER_PORT", "7001"), ("RISK_WORKERS", "5")]),
        )
        .unwrap();

        // file < env < CLI
        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.engine.workers, 5);
        assert_eq!(config.port, 7002);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cli_merge() {
        let mut config = ServerConfig::default();
        let cli = CliArgs {
            host: Some("192.168.1.1".to_string()),
            log_level: Some("debug".to_string()),
            workers: Some(6),
            ..Default::default()
        };
        config.merge_with_cli(&cli).unwrap();

        assert_eq!(config.host, "192.168.1.1");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.engine.workers, 6);
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::from_file(&PathBuf::from("/nonexistent/risk.toml"));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
