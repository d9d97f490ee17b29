use std::time::Duration;

use guildlink_domain::{GuildLinkError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Returns `false` when a
/// subscriber was already installed (e.g. by a test harness).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        info!(filter = %config.filter, json = config.json, "logging initialised");
    }
    installed
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a logical identifier (e.g. `"linking::request_authorization"`)
/// and must not carry user data.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    outcome: Result<(), &GuildLinkError>,
) {
    let duration_ms = elapsed.as_millis() as u64;

    match outcome {
        Ok(()) => info!(command, duration_ms, "command_execution_success"),
        Err(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            "command_execution_failure"
        ),
    }
}

/// Convert a `GuildLinkError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &GuildLinkError) -> &'static str {
    error.label()
}
