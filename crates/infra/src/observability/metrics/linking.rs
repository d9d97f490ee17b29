//! Reconciliation metrics
//!
//! Counters are fed from each cycle report by the link scheduler.
//!
//! ## Design
//! - **Relaxed ordering** for independent counters
//! - **Microsecond storage** for durations, reported in milliseconds

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use guildlink_core::CycleReport;
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Counters describing the linking coordinator's work so far.
#[derive(Debug, Default)]
pub struct LinkingMetrics {
    cycles: AtomicU64,
    promoted: AtomicU64,
    expired: AtomicU64,
    fetch_failures: AtomicU64,
    fetch_timeouts: AtomicU64,
    persist_failures: AtomicU64,
    last_cycle_micros: AtomicU64,
}

/// Point-in-time copy of [`LinkingMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkingMetricsSnapshot {
    pub cycles: u64,
    pub promoted: u64,
    pub expired: u64,
    pub fetch_failures: u64,
    pub fetch_timeouts: u64,
    pub persist_failures: u64,
    pub last_cycle_ms: u64,
}

impl LinkingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one cycle report into the counters.
    pub fn record_cycle(&self, report: &CycleReport) -> MetricsResult<()> {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.promoted.fetch_add(to_u64(report.promoted, "promoted")?, Ordering::Relaxed);
        self.expired.fetch_add(to_u64(report.expired, "expired")?, Ordering::Relaxed);
        self.fetch_failures
            .fetch_add(to_u64(report.fetch_failures, "fetch_failures")?, Ordering::Relaxed);
        self.fetch_timeouts
            .fetch_add(to_u64(report.fetch_timeouts, "fetch_timeouts")?, Ordering::Relaxed);
        if report.persist_error.is_some() {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
        }
        self.record_cycle_time(report.duration)
    }

    /// Record how long the last cycle took.
    pub fn record_cycle_time(&self, duration: Duration) -> MetricsResult<()> {
        let micros = u64::try_from(duration.as_micros())
            .map_err(|_| MetricsError::OutOfRange { metric: "last_cycle_micros" })?;
        self.last_cycle_micros.store(micros, Ordering::Relaxed);
        Ok(())
    }

    pub fn snapshot(&self) -> LinkingMetricsSnapshot {
        LinkingMetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            promoted: self.promoted.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            fetch_timeouts: self.fetch_timeouts.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            last_cycle_ms: self.last_cycle_micros.load(Ordering::Relaxed) / 1_000,
        }
    }
}

fn to_u64(value: usize, metric: &'static str) -> MetricsResult<u64> {
    u64::try_from(value).map_err(|_| MetricsError::OutOfRange { metric })
}
