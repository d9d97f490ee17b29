//! Port interfaces for linking
//!
//! These traits define the boundaries between the coordinator and the
//! shared store / durable snapshot implementations.

use async_trait::async_trait;
use guildlink_domain::{CredentialRow, Result};

use super::linked_store::LinkedMap;

/// Narrow view of the shared `guild` table.
///
/// The external callback handler writes to the same rows from another
/// process, so every read is only "eventually" up to date.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the row for a guild, `None` when no row exists.
    async fn fetch(&self, guild_id: &str) -> Result<Option<CredentialRow>>;

    /// Upsert the row with a null credential and the given state.
    async fn create_pending(&self, guild_id: &str, state: &str) -> Result<()>;

    /// Delete the row. Returns whether a row existed.
    async fn clear(&self, guild_id: &str) -> Result<bool>;
}

/// Durable storage for the linked-credential mapping.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the whole mapping. Missing or malformed snapshots load as empty.
    async fn load(&self) -> Result<LinkedMap>;

    /// Atomically replace the whole mapping.
    async fn save(&self, links: &LinkedMap) -> Result<()>;
}
