//! Entry points used by the command layer for the linking lifecycle.

use std::sync::Arc;

use guildlink_domain::{AuthorizationStart, Credential, GuildLinkError, Result};
use tracing::{info, instrument, warn};
use url::Url;

use super::linked_store::LinkedStore;
use super::ports::CredentialStore;
use super::session_registry::SessionRegistry;

/// Starts authorizations, answers credential lookups and revokes links.
pub struct LinkingService {
    registry: Arc<SessionRegistry>,
    linked: Arc<LinkedStore>,
    store: Arc<dyn CredentialStore>,
    auth_server: Url,
}

impl LinkingService {
    /// Build the service.
    ///
    /// # Errors
    /// Returns [`GuildLinkError::Config`] when `auth_server_prefix` is not an
    /// absolute URL that can carry path segments.
    pub fn new(
        registry: Arc<SessionRegistry>,
        linked: Arc<LinkedStore>,
        store: Arc<dyn CredentialStore>,
        auth_server_prefix: &str,
    ) -> Result<Self> {
        let auth_server = Url::parse(auth_server_prefix).map_err(|err| {
            GuildLinkError::Config(format!(
                "invalid auth server prefix {auth_server_prefix:?}: {err}"
            ))
        })?;
        if auth_server.cannot_be_a_base() {
            return Err(GuildLinkError::Config(format!(
                "auth server prefix {auth_server_prefix:?} cannot carry a path"
            )));
        }
        Ok(Self { registry, linked, store, auth_server })
    }

    /// Register a pending session and write the matching store row.
    ///
    /// # Errors
    /// Returns [`GuildLinkError::InvalidInput`] for an empty guild id, or the
    /// store error when the pending row cannot be written. In that case the
    /// session just registered is withdrawn again.
    #[instrument(skip(self))]
    pub async fn start_authorization(&self, guild_id: &str) -> Result<AuthorizationStart> {
        if guild_id.trim().is_empty() {
            return Err(GuildLinkError::InvalidInput("guild id must not be empty".into()));
        }

        let session = self.registry.register(guild_id);
        if let Err(err) = self.store.create_pending(guild_id, &session.expected_state).await {
            self.registry.remove_if_current(&session);
            warn!(guild_id, error = %err, "linking.authorization.store_failed");
            return Err(err);
        }

        let url = self.authorization_url(guild_id, &session.expected_state);
        info!(guild_id, expires_at = %session.expires_at, "linking.authorization.started");
        Ok(AuthorizationStart {
            guild_id: session.guild_id,
            state: session.expected_state,
            expires_at: session.expires_at,
            url,
        })
    }

    fn authorization_url(&self, guild_id: &str, state: &str) -> String {
        let mut url = self.auth_server.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["authorize", guild_id, state]);
        }
        url.into()
    }

    /// Credential for a linked guild.
    pub fn linked_credential(&self, guild_id: &str) -> Option<Credential> {
        self.linked.get(guild_id)
    }

    /// True when the guild has a linked credential.
    pub fn is_linked(&self, guild_id: &str) -> bool {
        self.linked.contains(guild_id)
    }

    /// Drop every trace of a guild's authorization.
    ///
    /// Cancels any pending session, deletes the store row, removes the link
    /// and rewrites the snapshot. Returns whether the guild was linked.
    ///
    /// # Errors
    /// Returns the store error if the row cannot be deleted (nothing else
    /// is changed), or the persistence error after the link was removed in
    /// memory.
    #[instrument(skip(self))]
    pub async fn revoke(&self, guild_id: &str) -> Result<bool> {
        let had_row = self.store.clear(guild_id).await?;
        let cancelled = self.registry.remove(guild_id).is_some();
        let was_linked = self.linked.unlink(guild_id).is_some();

        if was_linked {
            self.linked.persist().await?;
        }

        info!(
            guild_id,
            had_row,
            cancelled,
            was_linked,
            "linking.revoked"
        );
        Ok(was_linked)
    }

    /// Authorizations currently in flight.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }
}
