//! # GuildLink App
//!
//! Application layer: composition root, command handlers and the
//! `guildlink` entry point.
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the ports in `core` to the SQLite and snapshot adapters
//! - Command handlers translate service outcomes into user-visible text

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::*;
pub use context::*;
