#![allow(dead_code)]

use std::sync::Arc;

use guildlink_common::testing::MockClock;
use guildlink_domain::{Config, DatabaseConfig, LinkingConfig};
use guildlink_lib::AppContext;
use rusqlite::params;
use tempfile::TempDir;

/// Application context over a throwaway database and snapshot file.
pub struct TestApp {
    pub ctx: AppContext,
    pub clock: MockClock,
    /// Keep temporary directory alive for the lifetime of the app.
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        database: DatabaseConfig {
            path: dir.path().join("guilds.db").to_string_lossy().into_owned(),
            pool_size: 2,
        },
        linking: LinkingConfig {
            poll_interval_secs: 1,
            snapshot_path: dir.path().join("linked.json").to_string_lossy().into_owned(),
            auth_server_prefix: "https://auth.example.com/".into(),
            ..LinkingConfig::default()
        },
        ..Config::default()
    }
}

pub async fn setup_test_app() -> TestApp {
    let dir = TempDir::new().expect("failed to create temporary directory");
    setup_test_app_in(dir).await
}

pub async fn setup_test_app_in(dir: TempDir) -> TestApp {
    let clock = MockClock::new();
    let ctx = AppContext::new_with_clock(test_config(&dir), Arc::new(clock.clone()))
        .await
        .expect("failed to build application context");
    TestApp { ctx, clock, dir }
}

impl TestApp {
    /// Complete the authorization the way the callback handler does.
    pub fn complete_callback(&self, guild_id: &str, state: &str) {
        let credential = serde_json::json!({
            "token": "access",
            "refresh_token": "refresh",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client",
            "client_secret": "secret",
            "scopes": ["https://www.googleapis.com/auth/calendar"]
        });
        let conn = self.ctx.db.get_connection().expect("connection");
        conn.execute(
            "UPDATE guild SET credential = ?2, state = ?3 WHERE guild_id = ?1",
            params![guild_id, credential.to_string(), state],
        )
        .expect("callback write");
    }

    /// Start, complete and reconcile an authorization for `guild_id`.
    pub async fn link(&self, guild_id: &str) {
        let start = self.ctx.linking.start_authorization(guild_id).await.expect("start");
        self.complete_callback(guild_id, &start.state);
        let report = self.ctx.reconciliation.run_cycle().await;
        assert_eq!(report.promoted, 1, "guild {guild_id} should be promoted");
    }
}
