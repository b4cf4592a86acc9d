use overbot_core::profiles::ProfileStore;
use overbot_framework::prelude::*;

use super::ProfileArguments;

#[tracing::instrument(skip_all, fields(args = ?args))]
pub async fn profile_link(
    bot: &BotContext,
    ctx: &CommandContext,
    args: ProfileArguments,
) -> CommandResult {
    let premium = bot.database.is_premium(ctx.author_id).await?;
    let limit = bot.settings.limits.for_tier(premium);
    let count = bot.database.profile_count(ctx.author_id).await?;
    if count >= limit {
        tracing::debug!(count, limit, "profile limit reached");
        let mut message = format!(
            "You already have {count}/{limit} linked profiles. Unlink one with `/profile unlink` first."
        );
        if !premium {
            message.push_str(" Premium members can link more profiles.");
        }
        ctx.respond(bot).content(&message).await?;
        return Ok(());
    }

    let profile = bot
        .database
        .link(ctx.author_id, args.platform, &args.username)
        .await?;
    tracing::info!(profile = %profile.id, "linked a profile");

    let embed = EmbedBuilder::new()
        .color(DARK_GREEN)
        .title("Profile Linked")
        .field(EmbedFieldBuilder::new("Username", profile.username.clone()).inline())
        .field(EmbedFieldBuilder::new("Platform", profile.platform.display_name()).inline())
        .build();
    ctx.respond(bot).embeds(&[embed]).await?;

    Ok(())
}
