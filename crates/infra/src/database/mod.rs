//! Database implementations

pub mod credential_repository;
pub mod manager;
pub mod member_directory_repository;
pub mod sqlite_pool;

pub use credential_repository::SqliteCredentialStore;
pub use manager::DbManager;
pub use member_directory_repository::SqliteMemberDirectory;
pub use sqlite_pool::{create_sqlite_pool, SqliteConnection, SqlitePool, SqlitePoolConfig};
