//! # GuildLink Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for the shared `guild` and `linked` tables
//! - The JSON snapshot file for linked credentials
//! - The polling scheduler that drives reconciliation
//! - Configuration loading and metrics
//!
//! ## Architecture
//! - Implements traits defined in `guildlink-core`
//! - Contains all "impure" code (file and database I/O, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod scheduling;
pub mod snapshot;

// Re-export commonly used items
pub use database::{DbManager, SqliteCredentialStore, SqliteMemberDirectory};
pub use errors::InfraError;
pub use observability::metrics::{LinkingMetrics, LinkingMetricsSnapshot};
pub use scheduling::{LinkScheduler, LinkSchedulerConfig, SchedulerError, SchedulerResult};
pub use snapshot::JsonSnapshotFile;
