//! Test helpers shared with downstream crates.

pub mod time;

pub use time::MockClock;
