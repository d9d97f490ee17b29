//! # GuildLink Core
//!
//! Pure business logic layer - no database, file or HTTP code.
//!
//! This crate contains:
//! - Port interfaces (traits) for the shared credential store, the durable
//!   snapshot and the member directory
//! - The pending-session registry and the linked-credential store
//! - The reconciliation cycle that promotes or expires pending sessions
//! - Authorization-start, revocation and directory services
//!
//! ## Architecture Principles
//! - Only depends on `guildlink-common` and `guildlink-domain`
//! - All external dependencies via traits
//! - In-memory state is behind short-lived locks, never held across `.await`

pub mod directory;
pub mod linking;

pub use directory::ports::MemberDirectoryRepository;
pub use directory::GuildDirectory;
pub use linking::linked_store::{LinkedMap, LinkedStore};
pub use linking::ports::{CredentialStore, SnapshotStore};
pub use linking::reconcile::{
    decide, CycleReport, Decision, ReconciliationConfig, ReconciliationService,
};
pub use linking::service::LinkingService;
pub use linking::session_registry::{SessionBatches, SessionRegistry};
