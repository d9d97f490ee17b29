//! Guild member directory types

use serde::{Deserialize, Serialize};

/// A guild member's calendar-invite email.
///
/// `member_id` and `email` are unique across all guilds, not per guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLink {
    pub guild_id: String,
    pub member_id: String,
    pub email: String,
}
