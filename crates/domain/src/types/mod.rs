//! Domain data types

pub mod credential;
pub mod directory;
pub mod session;

pub use credential::Credential;
pub use directory::MemberLink;
pub use session::{AuthorizationStart, CredentialRow, PendingSession};
