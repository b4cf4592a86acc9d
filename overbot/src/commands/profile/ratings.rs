use chrono::Utc;
use overbot_core::ratings::{RatingOutcome, RatingSource, RatingStore};
use overbot_framework::prelude::*;
use overbot_models::rating::RatingSnapshot;

use super::{
    describe_profile, describe_ratings, has_profile, is_not_found, not_found, select,
    MemberArguments, PRIVATE_PROFILE,
};

#[tracing::instrument(skip_all, fields(args = ?args))]
pub async fn profile_ratings(
    bot: &BotContext,
    ctx: &CommandContext,
    args: MemberArguments,
) -> CommandResult {
    let owner = args.member.unwrap_or(ctx.author_id);
    if !has_profile(bot, ctx, owner).await? {
        return Ok(());
    }
    let Some(profile) = select(bot, ctx, owner, "Select a profile to view the ratings of.").await?
    else {
        return Ok(());
    };

    let ratings = match bot.overwatch.compute(&profile).await {
        Ok(RatingOutcome::Public(ratings)) => ratings,
        Ok(RatingOutcome::Private) => {
            ctx.respond(bot).content(PRIVATE_PROFILE).await?;
            return Ok(());
        }
        Err(err) if is_not_found(&err) => {
            ctx.respond(bot).content(&not_found(&profile)).await?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    bot.database
        .insert(&RatingSnapshot {
            profile_id: profile.id,
            ratings,
            captured_at: Utc::now(),
        })
        .await?;

    if owner == ctx.author_id {
        let outcome = bot
            .nickname_sync()
            .refresh_for(ctx.author_id, profile.id, &ctx.author_name)
            .await;
        tracing::debug!(outcome = ?outcome, "refreshed the nickname");
    }

    let embed = EmbedBuilder::new()
        .color(DARK_GREEN)
        .title(describe_profile(&profile))
        .description(describe_ratings(&ratings))
        .footer(EmbedFooterBuilder::new("Ratings are saved each time they are checked").build())
        .build();
    ctx.respond(bot).embeds(&[embed]).await?;

    Ok(())
}
