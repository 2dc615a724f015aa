//! REST API server for the tail-risk Monte Carlo engine
//!
//! This crate exposes the risk engine over HTTP: simulations, stress tests,
//! and health checks. All risk logic lives in `risk_engine`.

pub mod config;
pub mod routes;
pub mod server;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
