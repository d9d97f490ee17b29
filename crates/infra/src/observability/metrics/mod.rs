//! Metrics collection modules

pub mod linking;

pub use linking::{LinkingMetrics, LinkingMetricsSnapshot};
