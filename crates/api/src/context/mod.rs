//! Application context - dependency injection container

use std::sync::Arc;

use guildlink_common::{Clock, SystemClock};
use guildlink_core::{
    GuildDirectory, LinkedStore, LinkingService, ReconciliationConfig, ReconciliationService,
    SessionRegistry,
};
use guildlink_domain::{Config, GuildLinkError, Result};
use guildlink_infra::{
    DbManager, JsonSnapshotFile, LinkScheduler, LinkSchedulerConfig, LinkingMetrics,
    SqliteCredentialStore, SqliteMemberDirectory,
};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub registry: Arc<SessionRegistry>,
    pub linked: Arc<LinkedStore>,
    pub linking: Arc<LinkingService>,
    pub directory: Arc<GuildDirectory>,
    pub reconciliation: Arc<ReconciliationService>,
    pub metrics: Arc<LinkingMetrics>,

    scheduler: Mutex<LinkScheduler>,
}

impl AppContext {
    /// Build the context against the system clock.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::new_with_clock(config, Arc::new(SystemClock)).await
    }

    /// Wire every component against `clock`.
    ///
    /// Opening the store, applying the schema and probing the snapshot
    /// location are fatal: the process cannot link anything without them.
    pub async fn new_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::from_config(&config.database).map_err(|err| {
            error!(error = %err, "failed to open credential store");
            err
        })?);
        db.run_migrations().map_err(|err| {
            error!(error = %err, "failed to apply database schema");
            err
        })?;

        let snapshot = Arc::new(JsonSnapshotFile::new(&config.linking.snapshot_path));
        snapshot.ensure_writable().await.map_err(|err| {
            error!(
                path = %snapshot.path().display(),
                error = %err,
                "snapshot location is not writable"
            );
            err
        })?;

        let linked = Arc::new(LinkedStore::load(snapshot).await);
        let registry = Arc::new(SessionRegistry::new(config.linking.expiration(), clock.clone()));
        let store = Arc::new(SqliteCredentialStore::new(Arc::clone(&db)));

        let linking = Arc::new(LinkingService::new(
            Arc::clone(&registry),
            Arc::clone(&linked),
            store.clone(),
            &config.linking.auth_server_prefix,
        )?);
        let directory = Arc::new(GuildDirectory::new(
            Arc::clone(&linked),
            Arc::new(SqliteMemberDirectory::new(Arc::clone(&db))),
        ));
        let reconciliation = Arc::new(ReconciliationService::new(
            Arc::clone(&registry),
            Arc::clone(&linked),
            store,
            clock,
            ReconciliationConfig::from(&config.linking),
        ));

        let metrics = Arc::new(LinkingMetrics::new());
        let scheduler = LinkScheduler::new(
            Arc::clone(&reconciliation),
            LinkSchedulerConfig::from(&config.linking),
            Arc::clone(&metrics),
        );

        info!(
            db_path = %db.path().display(),
            linked = linked.len(),
            "app_context.initialised"
        );

        Ok(Self {
            config,
            db,
            registry,
            linked,
            linking,
            directory,
            reconciliation,
            metrics,
            scheduler: Mutex::new(scheduler),
        })
    }

    /// Start polling the credential store.
    pub async fn start_scheduler(&self) -> Result<()> {
        self.scheduler.lock().await.start().map_err(GuildLinkError::from)
    }

    /// True while the polling task is active.
    pub async fn scheduler_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Stop the scheduler, letting it run its final cycle and persist.
    ///
    /// Calling this when the scheduler never started is not an error.
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            scheduler.stop().await.map_err(GuildLinkError::from)?;
        }

        let metrics = self.metrics.snapshot();
        info!(
            cycles = metrics.cycles,
            promoted = metrics.promoted,
            linked = self.linked.len(),
            "app_context.shutdown"
        );
        Ok(())
    }
}
