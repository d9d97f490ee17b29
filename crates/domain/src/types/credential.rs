//! Opaque credential record written by the external callback handler

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Credential record for a linked guild.
///
/// The coordinator never interprets these fields; it only moves the record
/// from the shared store into the durable snapshot. Fields it does not know
/// about are kept in `extra` so nothing is lost on the way through.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Parse the `credential` column of a store row.
    ///
    /// Both SQL `NULL` (handled by the caller) and the JSON literal `null`
    /// mean "no credential yet".
    ///
    /// # Errors
    /// Returns the JSON error when the text is neither `null` nor an object.
    pub fn parse_stored(text: &str) -> serde_json::Result<Option<Self>> {
        serde_json::from_str::<Option<Self>>(text)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("Credential")
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| REDACTED))
            .field("scopes", &self.scopes)
            .field("extra_fields", &self.extra.len())
            .finish()
    }
}
