//! Authorization session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::Credential;

/// An authorization in flight, awaiting the external callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSession {
    pub guild_id: String,
    pub expected_state: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingSession {
    /// A session is expired from its expiry instant onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// One row of the shared `guild` table as observed by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRow {
    pub guild_id: String,
    pub credential: Option<Credential>,
    pub state: Option<String>,
}

/// What the authorization-start handler hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationStart {
    pub guild_id: String,
    pub state: String,
    pub expires_at: DateTime<Utc>,
    /// URL the guild administrator opens to begin the external flow.
    pub url: String,
}
