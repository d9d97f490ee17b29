//! Authorization commands.

use std::time::Instant;

use guildlink_domain::GuildLinkError;
use tracing::info;

use super::CommandReply;
use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Start linking `guild_id` and hand back the authorization URL.
pub async fn request_authorization(ctx: &AppContext, guild_id: &str) -> CommandReply {
    let command_name = "linking::request_authorization";
    let start = Instant::now();

    let result = ctx.linking.start_authorization(guild_id).await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));

    match result {
        Ok(authorization) => {
            let minutes = ctx.config.linking.expiration().num_minutes().max(1);
            CommandReply::ok(format!(
                "Here is the authorization url {} open the url in a browser and follow the \
                 prompt to give access to your calendar. The link expires in about {minutes} \
                 minutes.",
                authorization.url
            ))
        }
        Err(err) => CommandReply::failed(format!("Could not start authorization: {err}")),
    }
}

/// Remove the guild's link, pending authorization and stored credential.
pub async fn revoke_link(ctx: &AppContext, guild_id: &str) -> CommandReply {
    let command_name = "linking::revoke_link";
    let start = Instant::now();

    let result = ctx.linking.revoke(guild_id).await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));

    match result {
        Ok(true) => CommandReply::ok("Calendar access for this guild has been removed."),
        Ok(false) => CommandReply::ok("This guild was not linked to a calendar."),
        // Row and link are already gone; the next cycle rewrites the snapshot.
        Err(GuildLinkError::Persistence(_)) => CommandReply::ok(
            "Calendar access for this guild has been removed. Saving the change to disk \
             failed and will be retried automatically.",
        ),
        Err(err) => CommandReply::failed(format!("Could not remove calendar access: {err}")),
    }
}

/// Whether calendar events for `guild_id` can be dispatched.
pub fn linked_credential_available(ctx: &AppContext, guild_id: &str) -> CommandReply {
    let available = ctx.linking.linked_credential(guild_id).is_some();
    info!(command = "linking::linked_credential_available", available, "credential lookup");

    if available {
        CommandReply::ok("This guild is linked to a calendar.")
    } else {
        CommandReply::failed("No credentials found for this guild.")
    }
}
