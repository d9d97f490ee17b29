//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for GuildLink
///
/// "State mismatch" and "not yet ready" are deliberately absent: a fetched
/// row that does not satisfy promotion simply leaves the session pending.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GuildLinkError {
    /// Directory operation on a guild without a linked credential.
    #[error("Guild not linked: {0}")]
    NotLinked(String),

    /// Member id already registered (member ids are globally unique).
    #[error("Duplicate member: {0}")]
    DuplicateMember(String),

    /// Email already registered to another member (globally unique).
    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    /// Shared credential store could not be read or written.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Durable snapshot could not be written.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuildLinkError {
    /// Stable, low-cardinality label for logs and metrics.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotLinked(_) => "not_linked",
            Self::DuplicateMember(_) => "duplicate_member",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for GuildLink operations
pub type Result<T> = std::result::Result<T, GuildLinkError>;
