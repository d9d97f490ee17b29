//! In-memory port implementations for testing

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use guildlink_core::{CredentialStore, LinkedMap, MemberDirectoryRepository, SnapshotStore};
use guildlink_domain::{Credential, CredentialRow, GuildLinkError, MemberLink, Result};
use parking_lot::Mutex;

/// In-memory `guild` table with per-guild failure and delay injection.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    rows: Mutex<HashMap<String, CredentialRow>>,
    failing: Mutex<HashSet<String>>,
    slow: Mutex<HashMap<String, Duration>>,
    fetches: Mutex<Vec<String>>,
}

impl InMemoryCredentialStore {
    /// Simulate the external callback handler writing a credential.
    pub fn complete(&self, guild_id: &str, state: &str, credential: Credential) {
        self.rows.lock().insert(
            guild_id.to_string(),
            CredentialRow {
                guild_id: guild_id.to_string(),
                credential: Some(credential),
                state: Some(state.to_string()),
            },
        );
    }

    pub fn fail_fetches_for(&self, guild_id: &str) {
        self.failing.lock().insert(guild_id.to_string());
    }

    pub fn delay_fetches_for(&self, guild_id: &str, delay: Duration) {
        self.slow.lock().insert(guild_id.to_string(), delay);
    }

    pub fn row(&self, guild_id: &str) -> Option<CredentialRow> {
        self.rows.lock().get(guild_id).cloned()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn fetch(&self, guild_id: &str) -> Result<Option<CredentialRow>> {
        self.fetches.lock().push(guild_id.to_string());

        let delay = self.slow.lock().get(guild_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().contains(guild_id) {
            return Err(GuildLinkError::StoreUnavailable(format!("fetch {guild_id} failed")));
        }
        Ok(self.rows.lock().get(guild_id).cloned())
    }

    async fn create_pending(&self, guild_id: &str, state: &str) -> Result<()> {
        self.rows.lock().insert(
            guild_id.to_string(),
            CredentialRow {
                guild_id: guild_id.to_string(),
                credential: None,
                state: Some(state.to_string()),
            },
        );
        Ok(())
    }

    async fn clear(&self, guild_id: &str) -> Result<bool> {
        Ok(self.rows.lock().remove(guild_id).is_some())
    }
}

/// Snapshot kept in memory, counting saves.
#[derive(Default)]
pub struct InMemorySnapshot {
    stored: Mutex<LinkedMap>,
    saves: Mutex<usize>,
    fail_saves: Mutex<bool>,
}

impl InMemorySnapshot {
    pub fn stored(&self) -> LinkedMap {
        self.stored.lock().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshot {
    async fn load(&self) -> Result<LinkedMap> {
        Ok(self.stored.lock().clone())
    }

    async fn save(&self, links: &LinkedMap) -> Result<()> {
        if *self.fail_saves.lock() {
            return Err(GuildLinkError::Persistence("read-only filesystem".into()));
        }
        *self.stored.lock() = links.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Member directory enforcing global uniqueness like the `linked` table.
#[derive(Default)]
pub struct InMemoryDirectory {
    members: Mutex<BTreeMap<String, MemberLink>>,
}

#[async_trait]
impl MemberDirectoryRepository for InMemoryDirectory {
    async fn upsert_member(&self, link: &MemberLink) -> Result<()> {
        let mut members = self.members.lock();
        if let Some(existing) = members.get(&link.member_id) {
            if existing.guild_id != link.guild_id {
                return Err(GuildLinkError::DuplicateMember(link.member_id.clone()));
            }
        }
        if members.values().any(|other| other.email == link.email && other.member_id != link.member_id)
        {
            return Err(GuildLinkError::DuplicateEmail(link.email.clone()));
        }
        members.insert(link.member_id.clone(), link.clone());
        Ok(())
    }

    async fn members_for_guild(&self, guild_id: &str) -> Result<Vec<MemberLink>> {
        Ok(self.members.lock().values().filter(|link| link.guild_id == guild_id).cloned().collect())
    }
}
