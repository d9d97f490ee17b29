//! GuildLink - guild authorization linking coordinator
//!
//! Main entry point: load configuration, wire the application context and
//! poll the credential store until Ctrl-C.

use anyhow::Context;
use guildlink_lib::utils::logging::init_tracing;
use guildlink_lib::AppContext;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read before config so GUILDLINK_* values in .env apply.
    let dotenv = dotenvy::dotenv();

    let config = guildlink_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "could not load .env file"),
    }

    info!("GuildLink starting...");
    let ctx = AppContext::new_with_config(config)
        .await
        .context("failed to initialise application context")?;

    ctx.start_scheduler().await.context("failed to start link scheduler")?;
    info!(linked = ctx.linked.len(), "GuildLink initialized successfully");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown requested");

    ctx.shutdown().await.context("scheduler did not stop cleanly")?;
    Ok(())
}
