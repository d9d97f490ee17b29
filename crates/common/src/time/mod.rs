//! Time abstraction for testability
//!
//! Session expiry is expressed in wall-clock instants (`DateTime<Utc>`), so
//! the clock only has to answer "what time is it". Production code uses
//! [`SystemClock`]; tests use `testing::MockClock`.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock instant.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
