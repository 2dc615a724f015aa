//! Health check and monitoring endpoints
//!
//! Provides health and readiness endpoints for load balancer integration
//! and service availability monitoring.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use risk_engine::CacheStats;
use serde::Serialize;

use super::AppState;
use crate::config::Environment;

/// Health check response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// Server version
    pub version: String,
    /// Deployment environment
    pub environment: Environment,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Simulations run since start
    pub computations: u64,
    /// Result cache status
    pub cache: CacheHealth,
}

/// Result cache section of the health check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealth {
    /// Whether results are cached
    pub enabled: bool,
    /// Hit/miss/error counters
    #[serde(flatten)]
    pub stats: CacheStats,
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyResponse {
    /// Ready status
    pub ready: bool,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        environment: state.config.environment,
        uptime_secs: state.start_time.elapsed().as_secs(),
        computations: state.engine.computations(),
        cache: CacheHealth {
            enabled: state.engine.cache_enabled(),
            stats: state.engine.cache_stats(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready - Readiness endpoint
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ReadyResponse { ready: true }))
}
