use itertools::Itertools;
use overbot_core::profiles::ProfileStore;
use overbot_framework::prelude::*;

use super::{describe_profile, MemberArguments};

#[tracing::instrument(skip_all, fields(args = ?args))]
pub async fn profile_list(
    bot: &BotContext,
    ctx: &CommandContext,
    args: MemberArguments,
) -> CommandResult {
    let owner = args.member.unwrap_or(ctx.author_id);
    let limit = bot.settings.limits.resolve(bot.database.as_ref(), owner).await?;
    let profiles = bot.database.profiles_for_account(owner, limit).await?;

    if profiles.is_empty() {
        let message = if args.member.is_some() {
            format!("<@{owner}> has no linked profiles.")
        } else {
            "You have no linked profiles. Use `/profile link` to link one.".to_string()
        };
        ctx.respond(bot).content(&message).await?;
        return Ok(());
    }

    let description = profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| format!("`{}.` {}", i + 1, describe_profile(profile)))
        .join("\n");
    let embed = EmbedBuilder::new()
        .color(DARK_GREEN)
        .title("Linked Profiles")
        .description(format!("Profiles of <@{owner}>\n\n{description}"))
        .footer(EmbedFooterBuilder::new(format!("{}/{limit} profiles", profiles.len())).build())
        .build();
    ctx.respond(bot).embeds(&[embed]).await?;

    Ok(())
}
