//! Small utilities shared across GuildLink crates.
//!
//! - [`time`]: wall-clock abstraction so expiry logic can be driven by tests
//! - [`auth`]: state-token minting and log-safe identifier redaction
//! - [`testing`]: `MockClock` (behind the `test-utils` feature)

#![forbid(unsafe_code)]

pub mod auth;
pub mod time;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use auth::{generate_state_token, redact_identifier, states_match};
pub use time::{Clock, SystemClock};
