//! Guild member email directory
//!
//! Only linked guilds may record member emails; the invites are sent with
//! the guild's credential.

pub mod ports;
pub mod service;

pub use service::GuildDirectory;
