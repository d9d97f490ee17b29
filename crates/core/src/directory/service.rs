//! Directory operations gated on a guild being linked.

use std::collections::BTreeMap;
use std::sync::Arc;

use guildlink_common::redact_identifier;
use guildlink_domain::{GuildLinkError, MemberLink, Result};
use tracing::{info, instrument};

use super::ports::MemberDirectoryRepository;
use crate::linking::linked_store::LinkedStore;

/// Member email directory for linked guilds.
pub struct GuildDirectory {
    linked: Arc<LinkedStore>,
    members: Arc<dyn MemberDirectoryRepository>,
}

impl GuildDirectory {
    pub fn new(linked: Arc<LinkedStore>, members: Arc<dyn MemberDirectoryRepository>) -> Self {
        Self { linked, members }
    }

    /// Record `email` as the invite address for `member_id`.
    ///
    /// Surrounding whitespace is trimmed from both values. A member already
    /// linked under this guild has its email replaced.
    ///
    /// # Errors
    /// - [`GuildLinkError::NotLinked`] when the guild has no credential
    /// - [`GuildLinkError::InvalidInput`] for an empty member id or an email
    ///   without `@`
    /// - [`GuildLinkError::DuplicateMember`] / [`GuildLinkError::DuplicateEmail`]
    ///   when another guild or member already owns the value
    #[instrument(skip(self, email))]
    pub async fn add_member_email(
        &self,
        guild_id: &str,
        member_id: &str,
        email: &str,
    ) -> Result<MemberLink> {
        self.ensure_linked(guild_id)?;

        let member_id = member_id.trim();
        let email = email.trim();
        if member_id.is_empty() {
            return Err(GuildLinkError::InvalidInput("member id must not be empty".into()));
        }
        if !is_plausible_email(email) {
            return Err(GuildLinkError::InvalidInput(format!(
                "not an email address ({})",
                redact_identifier(email)
            )));
        }

        let link = MemberLink {
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            email: email.to_string(),
        };
        self.members.upsert_member(&link).await?;

        info!(guild_id, member_id, email = %redact_identifier(email), "directory.member.added");
        Ok(link)
    }

    /// Member id to email for every member of a linked guild.
    ///
    /// # Errors
    /// [`GuildLinkError::NotLinked`] when the guild has no credential, or
    /// the repository error.
    #[instrument(skip(self))]
    pub async fn get_member_emails(&self, guild_id: &str) -> Result<BTreeMap<String, String>> {
        self.ensure_linked(guild_id)?;

        let members = self.members.members_for_guild(guild_id).await?;
        Ok(members.into_iter().map(|link| (link.member_id, link.email)).collect())
    }

    fn ensure_linked(&self, guild_id: &str) -> Result<()> {
        if self.linked.contains(guild_id) {
            Ok(())
        } else {
            Err(GuildLinkError::NotLinked(guild_id.to_string()))
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
