//! Scheduling infrastructure for the reconciliation loop
//!
//! The link scheduler owns a single background task with explicit
//! lifecycle management: join handle tracked, cancellation token for stop,
//! timeout on join.

pub mod error;
pub mod link_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use link_scheduler::{LinkScheduler, LinkSchedulerConfig};
