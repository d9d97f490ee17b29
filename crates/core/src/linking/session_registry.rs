//! In-memory registry of authorizations in flight.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use guildlink_common::{generate_state_token, Clock};
use guildlink_domain::PendingSession;
use parking_lot::Mutex;
use tracing::debug;

/// Pending sessions keyed by guild id.
///
/// At most one session exists per guild; registering again replaces the
/// previous session and its state token.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, PendingSession>>,
    expiration: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    /// Create an empty registry whose sessions live for `expiration`.
    pub fn new(expiration: chrono::Duration, clock: Arc<dyn Clock>) -> Self {
        Self { sessions: Mutex::new(HashMap::new()), expiration, clock }
    }

    /// Start (or restart) a pending session for a guild.
    ///
    /// Returns the stored session so the caller can write the matching
    /// store row with the same state token. An expiry past the end of
    /// representable time is clamped to it.
    pub fn register(&self, guild_id: &str) -> PendingSession {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.expiration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = PendingSession {
            guild_id: guild_id.to_string(),
            expected_state: generate_state_token(),
            expires_at,
        };

        let replaced = self.sessions.lock().insert(guild_id.to_string(), session.clone());
        debug!(
            guild_id,
            expires_at = %session.expires_at,
            superseded = replaced.is_some(),
            "linking.session.registered"
        );
        session
    }

    /// Remove a guild's session. Removing an absent session is a no-op.
    pub fn remove(&self, guild_id: &str) -> Option<PendingSession> {
        self.sessions.lock().remove(guild_id)
    }

    /// Remove `session` only if it is still the current session for its
    /// guild.
    ///
    /// Reconciliation works on a snapshot; a guild re-registered while a
    /// cycle runs must keep its new session. Returns `false` when nothing
    /// was removed.
    pub fn remove_if_current(&self, session: &PendingSession) -> bool {
        let mut sessions = self.sessions.lock();
        match sessions.get(&session.guild_id) {
            Some(current) if current.expected_state == session.expected_state => {
                sessions.remove(&session.guild_id);
                true
            }
            _ => false,
        }
    }

    /// Current session for a guild.
    pub fn get(&self, guild_id: &str) -> Option<PendingSession> {
        self.sessions.lock().get(guild_id).cloned()
    }

    /// Split the current sessions into batches of at most `batch_size`.
    ///
    /// Membership is captured when this is called; later registrations or
    /// removals do not affect the returned batches. A `batch_size` of zero
    /// is treated as one.
    pub fn snapshot_batches(&self, batch_size: usize) -> SessionBatches {
        let snapshot: Vec<PendingSession> = self.sessions.lock().values().cloned().collect();
        SessionBatches { remaining: snapshot.into_iter(), batch_size: batch_size.max(1) }
    }

    /// Number of pending sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// True when no authorization is in flight.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

/// Lazy, finite sequence of session batches.
#[derive(Debug)]
pub struct SessionBatches {
    remaining: std::vec::IntoIter<PendingSession>,
    batch_size: usize,
}

impl Iterator for SessionBatches {
    type Item = Vec<PendingSession>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<PendingSession> = self.remaining.by_ref().take(self.batch_size).collect();
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.remaining.len().div_ceil(self.batch_size);
        (batches, Some(batches))
    }
}
