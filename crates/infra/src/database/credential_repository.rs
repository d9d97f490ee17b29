//! SQLite-backed implementation of the credential store port.
//!
//! The external callback handler writes `credential` and `state` into the
//! same `guild` rows from another process. This side only creates pending
//! rows, reads them back and deletes them on revocation.

use std::sync::Arc;

use async_trait::async_trait;
use guildlink_core::CredentialStore;
use guildlink_domain::{Credential, CredentialRow, GuildLinkError, Result as DomainResult};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::warn;

use super::manager::{map_sql_error, DbManager};

const SELECT_ROW_SQL: &str = "SELECT guild_id, credential, state FROM guild WHERE guild_id = ?1";
const UPSERT_PENDING_SQL: &str = "INSERT INTO guild (guild_id, credential, state) VALUES (?1, NULL, ?2)
     ON CONFLICT(guild_id) DO UPDATE SET credential = NULL, state = excluded.state";
const DELETE_ROW_SQL: &str = "DELETE FROM guild WHERE guild_id = ?1";

/// Credential store over the shared `guild` table.
pub struct SqliteCredentialStore {
    db: Arc<DbManager>,
}

impl SqliteCredentialStore {
    /// Construct a repository backed by the shared manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn fetch_row(
        conn: &rusqlite::Connection,
        guild_id: &str,
    ) -> DomainResult<Option<CredentialRow>> {
        let raw = conn
            .query_row(SELECT_ROW_SQL, params![guild_id], map_raw_row)
            .optional()
            .map_err(map_sql_error)?;

        raw.map(RawRow::into_row).transpose()
    }
}

struct RawRow {
    guild_id: String,
    credential: Option<String>,
    state: Option<String>,
}

fn map_raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow { guild_id: row.get(0)?, credential: row.get(1)?, state: row.get(2)? })
}

impl RawRow {
    fn into_row(self) -> DomainResult<CredentialRow> {
        let credential = match self.credential.as_deref() {
            None => None,
            Some(text) => Credential::parse_stored(text).map_err(|e| {
                warn!(guild_id = %self.guild_id, error = %e, "credential_store.row.malformed");
                GuildLinkError::StoreUnavailable(format!(
                    "malformed credential for guild {}: {e}",
                    self.guild_id
                ))
            })?,
        };
        Ok(CredentialRow { guild_id: self.guild_id, credential, state: self.state })
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn fetch(&self, guild_id: &str) -> DomainResult<Option<CredentialRow>> {
        let db = Arc::clone(&self.db);
        let guild_id = guild_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<CredentialRow>> {
            let conn = db.get_connection()?;
            Self::fetch_row(&conn, &guild_id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn create_pending(&self, guild_id: &str, state: &str) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let guild_id = guild_id.to_string();
        let state = state.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(UPSERT_PENDING_SQL, params![guild_id, state]).map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn clear(&self, guild_id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let guild_id = guild_id.to_string();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let deleted = conn.execute(DELETE_ROW_SQL, params![guild_id]).map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

pub(crate) fn map_join_error(err: task::JoinError) -> GuildLinkError {
    if err.is_cancelled() {
        GuildLinkError::Internal("database task cancelled".into())
    } else {
        GuildLinkError::Internal(format!("database task panic: {err}"))
    }
}
