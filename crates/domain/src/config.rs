//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTH_SERVER_PREFIX, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_PATH,
    DEFAULT_EXPIRATION_SECS, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LOG_FILTER,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POOL_SIZE, DEFAULT_SNAPSHOT_PATH, MAX_EXPIRATION_SECS,
};
use crate::errors::{GuildLinkError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub linking: LinkingConfig,
    pub logging: LoggingConfig,
}

/// Shared credential store (SQLite) configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Linking coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    /// Seconds slept between reconciliation cycles.
    pub poll_interval_secs: u64,
    /// Pending sessions reconciled per batch.
    pub batch_size: usize,
    /// Lifetime of a pending authorization.
    pub expiration_secs: u64,
    /// Timeout applied to each credential-store fetch.
    pub fetch_timeout_secs: u64,
    /// Durable snapshot of linked credentials.
    pub snapshot_path: String,
    /// Base URL of the external authorization server.
    pub auth_server_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DATABASE_PATH.to_string(), pool_size: DEFAULT_POOL_SIZE }
    }
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            batch_size: DEFAULT_BATCH_SIZE,
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
            auth_server_prefix: DEFAULT_AUTH_SERVER_PREFIX.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

impl LinkingConfig {
    /// Sleep between reconciliation cycles.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Bound on each credential-store fetch.
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Pending-session lifetime as a wall-clock duration.
    ///
    /// Values beyond what `chrono` can represent saturate; [`Config::validate`]
    /// rejects them long before that.
    pub fn expiration(&self) -> chrono::Duration {
        i64::try_from(self.expiration_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

impl Config {
    /// Reject values the coordinator cannot run with.
    ///
    /// # Errors
    /// Returns `GuildLinkError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(GuildLinkError::Config("database.path must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(GuildLinkError::Config("database.pool_size must be at least 1".into()));
        }
        if self.linking.snapshot_path.trim().is_empty() {
            return Err(GuildLinkError::Config("linking.snapshot_path must not be empty".into()));
        }
        if self.linking.batch_size == 0 {
            return Err(GuildLinkError::Config("linking.batch_size must be at least 1".into()));
        }
        if self.linking.poll_interval_secs == 0 {
            return Err(GuildLinkError::Config(
                "linking.poll_interval_secs must be at least 1".into(),
            ));
        }
        if self.linking.expiration_secs == 0 {
            return Err(GuildLinkError::Config("linking.expiration_secs must be at least 1".into()));
        }
        if self.linking.expiration_secs > MAX_EXPIRATION_SECS {
            return Err(GuildLinkError::Config(format!(
                "linking.expiration_secs must be at most {MAX_EXPIRATION_SECS}"
            )));
        }
        if self.linking.fetch_timeout_secs == 0 {
            return Err(GuildLinkError::Config(
                "linking.fetch_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
