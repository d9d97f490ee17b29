//! Observability infrastructure for the linking coordinator
//!
//! Record methods return `MetricsResult<()>` so callers route failures
//! through a single `log_metric` helper instead of ignoring them. Counters
//! are plain atomics; nothing here blocks.

pub mod metrics;

/// Metrics error type
///
/// Recording currently always succeeds; the error exists so limits can be
/// added without changing every call site.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// A value did not fit the counter it was recorded into.
    #[error("Value out of range for metric '{metric}'")]
    OutOfRange {
        /// Metric name
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Log (never propagate) a failed metric recording.
pub fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        tracing::warn!(metric = metric, error = ?err, "Failed to record metric");
    }
}
