//! Controllable clock for deterministic expiry tests
//!
//! # Examples
//!
//! ```
//! use chrono::Duration;
//! use guildlink_common::testing::MockClock;
//! use guildlink_common::Clock;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::seconds(5));
//! assert_eq!(clock.now() - start, Duration::seconds(5));
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::time::Clock;

/// Mock clock whose time only moves when told to.
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// the code under test and advance another.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a clock frozen at a fixed, arbitrary instant.
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).single().unwrap_or_else(Utc::now);
        Self::at(start)
    }

    /// Create a clock frozen at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { current: Arc::new(Mutex::new(instant)) }
    }

    /// Move the clock forward (or backward, for negative durations).
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        *current += by;
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock()
    }
}
