#![allow(dead_code)]

use std::sync::{Arc, Once};

use guildlink_common::testing::MockClock;
use guildlink_core::{LinkedStore, ReconciliationConfig, ReconciliationService, SessionRegistry};
use guildlink_infra::database::{DbManager, SqliteCredentialStore};
use guildlink_infra::snapshot::JsonSnapshotFile;
use rusqlite::params;
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (visible with
/// `--nocapture`).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("guildlink=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Real SQLite store plus JSON snapshot in a temporary directory.
pub struct TestStack {
    pub dir: TempDir,
    pub db: Arc<DbManager>,
    pub clock: MockClock,
    pub store: Arc<SqliteCredentialStore>,
    pub snapshot: Arc<JsonSnapshotFile>,
    pub registry: Arc<SessionRegistry>,
    pub linked: Arc<LinkedStore>,
    pub service: Arc<ReconciliationService>,
}

impl TestStack {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("temporary directory should be created");
        Self::in_dir(dir).await
    }

    /// Build a stack over an existing directory, loading whatever snapshot
    /// it already holds.
    pub async fn in_dir(dir: TempDir) -> Self {
        init_tracing();

        let db = Arc::new(
            DbManager::new(dir.path().join("guilds.db"), 4)
                .expect("database manager should initialise"),
        );
        db.run_migrations().expect("schema migrations should apply");

        let clock = MockClock::new();
        let store = Arc::new(SqliteCredentialStore::new(db.clone()));
        let snapshot = Arc::new(JsonSnapshotFile::new(dir.path().join("linked.json")));
        let registry = Arc::new(SessionRegistry::new(
            chrono::Duration::seconds(500),
            Arc::new(clock.clone()),
        ));
        let linked = Arc::new(LinkedStore::load(snapshot.clone()).await);
        let service = Arc::new(ReconciliationService::new(
            registry.clone(),
            linked.clone(),
            store.clone(),
            Arc::new(clock.clone()),
            ReconciliationConfig { batch_size: 2, ..ReconciliationConfig::default() },
        ));

        Self { dir, db, clock, store, snapshot, registry, linked, service }
    }

    /// Write a credential the way the external callback handler does.
    pub fn complete_callback(&self, guild_id: &str, state: &str, credential_json: &str) {
        let conn = self.db.get_connection().expect("connection should be available");
        conn.execute(
            "INSERT INTO guild (guild_id, credential, state) VALUES (?1, ?2, ?3)
             ON CONFLICT(guild_id) DO UPDATE SET credential = excluded.credential, state = excluded.state",
            params![guild_id, credential_json, state],
        )
        .expect("callback write should succeed");
    }
}
