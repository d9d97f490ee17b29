//! Domain constants
//!
//! Defaults for the linking coordinator. All of them can be overridden
//! through [`crate::LinkingConfig`].

/// Seconds between reconciliation cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Pending sessions reconciled per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Seconds a pending authorization stays valid.
pub const DEFAULT_EXPIRATION_SECS: u64 = 500;

/// Longest accepted pending-authorization lifetime (one year).
pub const MAX_EXPIRATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound on a single credential-store fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_DATABASE_PATH: &str = "guilds.db";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_SNAPSHOT_PATH: &str = "linked.json";
pub const DEFAULT_AUTH_SERVER_PREFIX: &str = "http://localhost:5000/";
pub const DEFAULT_LOG_FILTER: &str = "info";
