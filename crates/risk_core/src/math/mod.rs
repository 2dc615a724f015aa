//! Numerical helpers shared across layers.
//!
//! - [`order_stats`]: sorting, linear-interpolated percentiles and means

pub mod order_stats;

pub use order_stats::{mean, percentile_sorted, sort_ascending};
