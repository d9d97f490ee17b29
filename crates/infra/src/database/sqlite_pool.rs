//! SQLite pool helpers
//!
//! Builds the r2d2 pool shared by every repository and applies the
//! per-connection pragmas the store needs while another process writes to
//! the same file.

use std::path::Path;
use std::time::Duration;

use guildlink_domain::{GuildLinkError, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::warn;

/// Pool of SQLite connections.
pub type SqlitePool = Pool<SqliteConnectionManager>;

/// Pooled connection handed out by [`SqlitePool`].
pub type SqliteConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool tunables.
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    pub max_size: u32,
    pub connection_timeout: Duration,
    /// How long a statement waits on a lock held by the callback handler.
    pub busy_timeout: Duration,
    pub enable_wal: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 4,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
        }
    }
}

/// Apply connection-level pragmas
///
/// - WAL mode so the callback handler's writes do not block our reads
/// - NORMAL synchronous mode
/// - Busy timeout for lock contention
pub fn apply_connection_pragmas(
    conn: &rusqlite::Connection,
    config: &SqlitePoolConfig,
) -> rusqlite::Result<()> {
    let mut pragma_sql = String::new();
    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
    }
    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");
    conn.execute_batch(&pragma_sql)?;

    conn.busy_timeout(config.busy_timeout)
}

/// Open (creating if needed) the database at `path` behind a pool.
///
/// A test connection is checked out before returning, so an unreachable or
/// corrupt file fails here rather than on the first query.
pub fn create_sqlite_pool<P: AsRef<Path>>(path: P, config: SqlitePoolConfig) -> Result<SqlitePool> {
    let pool_config = config.clone();
    let manager = SqliteConnectionManager::file(path.as_ref())
        .with_init(move |conn| apply_connection_pragmas(conn, &pool_config));

    let pool = Pool::builder()
        .max_size(config.max_size.max(1))
        .connection_timeout(config.connection_timeout)
        .build(manager)
        .map_err(|e| {
            warn!(error = %e, "sqlite.pool.create_failed");
            GuildLinkError::StoreUnavailable(format!("failed to create pool: {e}"))
        })?;

    Ok(pool)
}
