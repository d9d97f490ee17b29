//! SQLite-backed member directory over the `linked` table.

use std::sync::Arc;

use async_trait::async_trait;
use guildlink_core::MemberDirectoryRepository;
use guildlink_domain::{GuildLinkError, MemberLink, Result as DomainResult};
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tokio::task;

use super::credential_repository::map_join_error;
use super::manager::{map_sql_error, DbManager};
use crate::errors::is_unique_violation;

const MEMBER_GUILD_SQL: &str = "SELECT guild_id FROM linked WHERE member_id = ?1";
const EMAIL_OWNER_SQL: &str = "SELECT member_id FROM linked WHERE email = ?1";
const UPSERT_MEMBER_SQL: &str = "INSERT INTO linked (guild_id, member_id, email) VALUES (?1, ?2, ?3)
     ON CONFLICT(member_id) DO UPDATE SET email = excluded.email";
const MEMBERS_FOR_GUILD_SQL: &str =
    "SELECT guild_id, member_id, email FROM linked WHERE guild_id = ?1 ORDER BY member_id";

/// Member directory enforcing global uniqueness of member ids and emails.
pub struct SqliteMemberDirectory {
    db: Arc<DbManager>,
}

impl SqliteMemberDirectory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn upsert(conn: &mut rusqlite::Connection, link: &MemberLink) -> DomainResult<()> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_sql_error)?;

        let member_guild: Option<String> = tx
            .query_row(MEMBER_GUILD_SQL, params![link.member_id], |row| row.get(0))
            .optional()
            .map_err(map_sql_error)?;
        if matches!(member_guild, Some(ref guild) if guild != &link.guild_id) {
            return Err(GuildLinkError::DuplicateMember(link.member_id.clone()));
        }

        let email_owner: Option<String> = tx
            .query_row(EMAIL_OWNER_SQL, params![link.email], |row| row.get(0))
            .optional()
            .map_err(map_sql_error)?;
        if matches!(email_owner, Some(ref owner) if owner != &link.member_id) {
            return Err(GuildLinkError::DuplicateEmail(link.email.clone()));
        }

        tx.execute(UPSERT_MEMBER_SQL, params![link.guild_id, link.member_id, link.email])
            .map_err(|e| map_upsert_error(e, link))?;
        tx.commit().map_err(map_sql_error)
    }

    fn list(conn: &rusqlite::Connection, guild_id: &str) -> DomainResult<Vec<MemberLink>> {
        let mut stmt = conn.prepare(MEMBERS_FOR_GUILD_SQL).map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(MemberLink { guild_id: row.get(0)?, member_id: row.get(1)?, email: row.get(2)? })
            })
            .map_err(map_sql_error)?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

/// Unique violations that slip past the checks (rows written by another
/// process between them) still map to the duplicate outcomes.
fn map_upsert_error(err: rusqlite::Error, link: &MemberLink) -> GuildLinkError {
    if !is_unique_violation(&err) {
        return map_sql_error(err);
    }
    if err.to_string().contains("linked.email") {
        GuildLinkError::DuplicateEmail(link.email.clone())
    } else {
        GuildLinkError::DuplicateMember(link.member_id.clone())
    }
}

#[async_trait]
impl MemberDirectoryRepository for SqliteMemberDirectory {
    async fn upsert_member(&self, link: &MemberLink) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let link = link.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            Self::upsert(&mut conn, &link)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn members_for_guild(&self, guild_id: &str) -> DomainResult<Vec<MemberLink>> {
        let db = Arc::clone(&self.db);
        let guild_id = guild_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<MemberLink>> {
            let conn = db.get_connection()?;
            Self::list(&conn, &guild_id)
        })
        .await
        .map_err(map_join_error)?
    }
}
