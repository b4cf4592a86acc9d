use overbot_core::profiles::ProfileStore;
use overbot_framework::prelude::*;

use super::{describe_profile, has_profile, select, ProfileArguments};

#[tracing::instrument(skip_all, fields(args = ?args))]
pub async fn profile_update(
    bot: &BotContext,
    ctx: &CommandContext,
    args: ProfileArguments,
) -> CommandResult {
    if !has_profile(bot, ctx, ctx.author_id).await? {
        return Ok(());
    }
    let Some(profile) = select(bot, ctx, ctx.author_id, "Select a profile to update.").await? else {
        return Ok(());
    };

    if !bot
        .database
        .update(profile.id, args.platform, &args.username)
        .await?
    {
        // Unlinked while the menu was open.
        ctx.respond(bot).content("That profile no longer exists.").await?;
        return Ok(());
    }

    let message = format!(
        "Updated **{}** to **{} ({})**.",
        describe_profile(&profile),
        args.username,
        args.platform.display_name()
    );
    ctx.respond(bot).content(&message).await?;

    Ok(())
}
