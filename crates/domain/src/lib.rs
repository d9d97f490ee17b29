//! # GuildLink Domain
//!
//! Business domain types and models for the guild linking coordinator.
//!
//! This crate contains:
//! - Domain data types (pending sessions, credential rows, member links)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other GuildLink crates
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
