//! Port interfaces for the member directory

use async_trait::async_trait;
use guildlink_domain::{MemberLink, Result};

/// Storage for member links.
///
/// Member ids and emails are unique across every guild. Implementations
/// report collisions as [`guildlink_domain::GuildLinkError::DuplicateMember`]
/// or [`guildlink_domain::GuildLinkError::DuplicateEmail`].
#[async_trait]
pub trait MemberDirectoryRepository: Send + Sync {
    /// Insert a link. Re-inserting an identical link is a no-op.
    async fn upsert_member(&self, link: &MemberLink) -> Result<()>;

    /// Every member linked under a guild.
    async fn members_for_guild(&self, guild_id: &str) -> Result<Vec<MemberLink>>;
}
