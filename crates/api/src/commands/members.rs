//! Member directory commands.

use std::time::Instant;

use guildlink_domain::GuildLinkError;

use super::CommandReply;
use crate::utils::logging::log_command_execution;
use crate::AppContext;

/// Register `email` for `member_id` so they receive invites for the guild.
pub async fn add_email(
    ctx: &AppContext,
    guild_id: &str,
    member_id: &str,
    email: &str,
) -> CommandReply {
    let command_name = "members::add_email";
    let start = Instant::now();

    let result = ctx.directory.add_member_email(guild_id, member_id, email).await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));

    match result {
        Ok(_) => CommandReply::ok(
            "You will now receive calendar invites for events in this guild at the given email.",
        ),
        Err(GuildLinkError::NotLinked(_)) => {
            CommandReply::failed("This guild has not linked a calendar yet.")
        }
        Err(GuildLinkError::DuplicateMember(_)) => {
            CommandReply::failed("You already have an email registered in another guild.")
        }
        Err(GuildLinkError::DuplicateEmail(_)) => {
            CommandReply::failed("That email address is already registered.")
        }
        Err(GuildLinkError::InvalidInput(reason)) => {
            CommandReply::failed(format!("Failed to add email address: {reason}"))
        }
        Err(_) => CommandReply::failed("Failed to add email address."),
    }
}

/// List registered members as `member_id: email` lines.
pub async fn list_emails(ctx: &AppContext, guild_id: &str) -> CommandReply {
    let command_name = "members::list_emails";
    let start = Instant::now();

    let result = ctx.directory.get_member_emails(guild_id).await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().map(|_| ()));

    match result {
        Ok(members) if members.is_empty() => {
            CommandReply::ok("This guild has no linked members.")
        }
        Ok(members) => {
            let lines: Vec<String> =
                members.iter().map(|(member, email)| format!("{member}: {email}")).collect();
            CommandReply::ok(lines.join("\n"))
        }
        Err(GuildLinkError::NotLinked(_)) => {
            CommandReply::failed("This guild has not linked a calendar yet.")
        }
        Err(err) => CommandReply::failed(format!("Could not list members: {err}")),
    }
}
