//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `GUILDLINK_DB_PATH` is set, configuration comes from the
//!    environment; unset optional variables keep their defaults
//! 2. Otherwise the first config file found by [`probe_config_paths`] is used
//! 3. With neither, built-in defaults apply
//!
//! Whatever the source, the result is validated before it is returned.
//!
//! ## Environment Variables
//! - `GUILDLINK_DB_PATH`: Shared store (SQLite) file path
//! - `GUILDLINK_DB_POOL_SIZE`: Connection pool size
//! - `GUILDLINK_SNAPSHOT_PATH`: Linked-credential snapshot file
//! - `GUILDLINK_AUTH_SERVER_PREFIX`: Base URL of the authorization server
//! - `GUILDLINK_POLL_INTERVAL_SECS`: Seconds between reconciliation cycles
//! - `GUILDLINK_BATCH_SIZE`: Pending sessions per batch
//! - `GUILDLINK_EXPIRATION_SECS`: Pending authorization lifetime
//! - `GUILDLINK_FETCH_TIMEOUT_SECS`: Per-fetch timeout
//! - `GUILDLINK_LOG_FILTER`: `EnvFilter` directive
//! - `GUILDLINK_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}`, `./guildlink.{json,toml}`
//! 2. `../config.{json,toml}`
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use guildlink_domain::{Config, GuildLinkError, Result};
use url::Url;

const DB_PATH_VAR: &str = "GUILDLINK_DB_PATH";

/// Load and validate configuration using the strategy above.
///
/// # Errors
/// Returns `GuildLinkError::Config` if the chosen source is unreadable,
/// malformed, or fails validation.
pub fn load() -> Result<Config> {
    let config = if std::env::var_os(DB_PATH_VAR).is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else if let Some(path) = probe_config_paths() {
        load_from_file(Some(path))?
    } else {
        tracing::info!("No configuration found, using defaults");
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// `GUILDLINK_DB_PATH` is required; every other variable falls back to its
/// default when unset.
///
/// # Errors
/// Returns `GuildLinkError::Config` if the required variable is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var(DB_PATH_VAR)?;
    if let Some(pool_size) = env_parse::<u32>("GUILDLINK_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }

    let linking = &mut config.linking;
    if let Some(path) = env_opt("GUILDLINK_SNAPSHOT_PATH") {
        linking.snapshot_path = path;
    }
    if let Some(prefix) = env_opt("GUILDLINK_AUTH_SERVER_PREFIX") {
        linking.auth_server_prefix = prefix;
    }
    if let Some(secs) = env_parse("GUILDLINK_POLL_INTERVAL_SECS")? {
        linking.poll_interval_secs = secs;
    }
    if let Some(size) = env_parse("GUILDLINK_BATCH_SIZE")? {
        linking.batch_size = size;
    }
    if let Some(secs) = env_parse("GUILDLINK_EXPIRATION_SECS")? {
        linking.expiration_secs = secs;
    }
    if let Some(secs) = env_parse("GUILDLINK_FETCH_TIMEOUT_SECS")? {
        linking.fetch_timeout_secs = secs;
    }

    if let Some(filter) = env_opt("GUILDLINK_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("GUILDLINK_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields missing from the file keep their defaults.
///
/// # Errors
/// Returns `GuildLinkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GuildLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GuildLinkError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GuildLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Validate field ranges and the authorization server URL.
///
/// # Errors
/// Returns `GuildLinkError::Config` describing the first problem found.
pub fn validate(config: &Config) -> Result<()> {
    config.validate()?;

    let prefix = &config.linking.auth_server_prefix;
    let url = Url::parse(prefix).map_err(|e| {
        GuildLinkError::Config(format!("linking.auth_server_prefix {prefix:?} is not a URL: {e}"))
    })?;
    if url.cannot_be_a_base() {
        return Err(GuildLinkError::Config(format!(
            "linking.auth_server_prefix {prefix:?} must be an absolute http(s) URL"
        )));
    }
    Ok(())
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GuildLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GuildLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GuildLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "config.json",
        "config.toml",
        "guildlink.json",
        "guildlink.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.is_file())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        GuildLinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| GuildLinkError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
