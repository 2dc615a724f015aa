//! Route modules for the risk server
//!
//! This module contains endpoint group-specific routers:
//! - health: Health check and readiness endpoints
//! - simulate: Monte Carlo VaR/CVaR simulations
//! - stress: Price and volatility stress tests

pub mod error;
pub mod health;
pub mod simulate;
pub mod stress;

use axum::Router;
use risk_engine::RiskEngine;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Shared risk engine
    pub engine: Arc<RiskEngine>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>, engine: Arc<RiskEngine>) -> Self {
        Self {
            config,
            engine,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(simulate::routes())
        .merge(stress::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use risk_engine::EngineConfig;

    /// State backed by a small seeded engine
    pub fn test_state() -> AppState {
        let mut config = ServerConfig::default();
        config.engine = EngineConfig::builder()
            .workers(2)
            .seed(7)
            .build()
            .unwrap();
        let engine = RiskEngine::new(config.engine.clone()).unwrap();
        AppState::new(Arc::new(config), Arc::new(engine))
    }
}
