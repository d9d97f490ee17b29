//! Confirmed guild links and their durable snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use guildlink_domain::{Credential, Result};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use super::ports::SnapshotStore;

/// Guild id to credential, ordered so snapshots are stable on disk.
pub type LinkedMap = BTreeMap<String, Credential>;

/// In-memory mapping of linked guilds backed by a [`SnapshotStore`].
///
/// Mutations only touch memory; [`LinkedStore::persist`] rewrites the whole
/// snapshot. Concurrent persists are serialized so an older mapping never
/// overwrites a newer one.
pub struct LinkedStore {
    links: RwLock<LinkedMap>,
    snapshot: Arc<dyn SnapshotStore>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl LinkedStore {
    /// Empty store that persists to `snapshot`.
    pub fn new(snapshot: Arc<dyn SnapshotStore>) -> Self {
        Self::with_links(snapshot, LinkedMap::new())
    }

    fn with_links(snapshot: Arc<dyn SnapshotStore>, links: LinkedMap) -> Self {
        Self { links: RwLock::new(links), snapshot, persist_lock: tokio::sync::Mutex::new(()) }
    }

    /// Load the mapping from `snapshot`.
    ///
    /// A snapshot that cannot be read starts the store empty; the next
    /// persist replaces it.
    #[instrument(skip(snapshot))]
    pub async fn load(snapshot: Arc<dyn SnapshotStore>) -> Self {
        let links = match snapshot.load().await {
            Ok(links) => links,
            Err(err) => {
                warn!(error = %err, "linked_store.load.failed");
                LinkedMap::new()
            }
        };
        info!(linked = links.len(), "linked_store.loaded");
        Self::with_links(snapshot, links)
    }

    /// Credential linked to a guild, if any.
    pub fn get(&self, guild_id: &str) -> Option<Credential> {
        self.links.read().get(guild_id).cloned()
    }

    /// True when the guild has a linked credential.
    pub fn contains(&self, guild_id: &str) -> bool {
        self.links.read().contains_key(guild_id)
    }

    /// Insert or replace the credential for a guild.
    pub fn link(&self, guild_id: &str, credential: Credential) {
        let replaced = self.links.write().insert(guild_id.to_string(), credential);
        debug!(guild_id, relinked = replaced.is_some(), "linked_store.linked");
    }

    /// Remove a guild's credential, returning it if it was linked.
    pub fn unlink(&self, guild_id: &str) -> Option<Credential> {
        self.links.write().remove(guild_id)
    }

    /// Number of linked guilds.
    pub fn len(&self) -> usize {
        self.links.read().len()
    }

    /// True when no guild is linked.
    pub fn is_empty(&self) -> bool {
        self.links.read().is_empty()
    }

    /// Copy of the current mapping.
    pub fn snapshot(&self) -> LinkedMap {
        self.links.read().clone()
    }

    /// Rewrite the durable snapshot with the current mapping.
    ///
    /// # Errors
    /// Returns [`guildlink_domain::GuildLinkError::Persistence`] (or whatever
    /// the snapshot store reports) when the write fails. In-memory state is
    /// left as is.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let links = self.snapshot();
        self.snapshot.save(&links).await?;
        debug!(linked = links.len(), "linked_store.persisted");
        Ok(())
    }
}
