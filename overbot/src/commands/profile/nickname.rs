use chrono::Utc;
use overbot_core::{
    nickname::{BindOutcome, UnbindOutcome},
    ratings::{RatingOutcome, RatingSource, RatingStore},
};
use overbot_framework::prelude::*;
use overbot_models::rating::RatingSnapshot;

use super::{
    explain_mutation, has_profile, is_not_found, not_found, select, PRIVATE_PROFILE,
};

#[tracing::instrument(skip_all)]
pub async fn profile_nickname(bot: &BotContext, ctx: &CommandContext, _args: ()) -> CommandResult {
    let Some(guild_id) = ctx.guild_id else {
        ctx.respond(bot)
            .content("This command can only be used in a server.")
            .await?;
        return Ok(());
    };
    let sync = bot.nickname_sync();

    if sync.exists(ctx.author_id).await? {
        if !prompt(bot, ctx, "This will remove your ratings from your nickname.").await? {
            return Ok(());
        }
        let message = match sync.unbind(ctx.author_id).await? {
            UnbindOutcome::NotBound => "Your nickname does not show any ratings.".to_string(),
            UnbindOutcome::Unbound { failure: None } => {
                "Your ratings were removed from your nickname.".to_string()
            }
            UnbindOutcome::Unbound {
                failure: Some(err),
            } => format!(
                "Your ratings will no longer be shown, but I could not reset your nickname: {}",
                explain_mutation(&err)
            ),
        };
        ctx.respond(bot).content(&message).await?;
        return Ok(());
    }

    if !has_profile(bot, ctx, ctx.author_id).await? {
        return Ok(());
    }
    let question = "This will show the ratings of one of your profiles in your nickname on this server.";
    if !prompt(bot, ctx, question).await? {
        return Ok(());
    }

    let guild = bot.http.guild(guild_id.0).await?.model().await?;
    if guild.owner_id == ctx.author_id.0 {
        ctx.respond(bot)
            .content("Discord does not let bots change the nickname of the server owner.")
            .await?;
        return Ok(());
    }

    let Some(profile) = select(
        bot,
        ctx,
        ctx.author_id,
        "Select the profile whose ratings your nickname should show.",
    )
    .await?
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

    let outcome = sync
        .bind(ctx.author_id, guild_id, &profile, &ratings, &ctx.author_name)
        .await?;
    let message = match outcome {
        BindOutcome::AlreadyBound(_) => {
            "Your nickname already shows your ratings. Run this command again to remove them."
                .to_string()
        }
        BindOutcome::Bound {
            nickname,
            failure: None,
            ..
        } => format!("Your nickname is now `{nickname}`."),
        BindOutcome::Bound {
            failure: Some(err), ..
        } => format!(
            "Your nickname will follow this profile, but I could not change it right now: {}",
            explain_mutation(&err)
        ),
    };
    ctx.respond(bot).content(&message).await?;

    Ok(())
}
