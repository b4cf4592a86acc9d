use overbot_core::{nickname::UnbindOutcome, profiles::ProfileStore};
use overbot_framework::prelude::*;

use super::{describe_profile, explain_mutation, has_profile, select};

#[tracing::instrument(skip_all)]
pub async fn profile_unlink(bot: &BotContext, ctx: &CommandContext, _args: ()) -> CommandResult {
    if !has_profile(bot, ctx, ctx.author_id).await? {
        return Ok(());
    }
    let Some(profile) = select(bot, ctx, ctx.author_id, "Select a profile to unlink.").await? else {
        return Ok(());
    };

    let question = format!(
        "Are you sure you want to unlink **{}**? Its ratings history is deleted with it.",
        describe_profile(&profile)
    );
    if !prompt(bot, ctx, &question).await? {
        ctx.respond(bot).content("Nothing was unlinked.").await?;
        return Ok(());
    }

    // The nickname has to stop showing this profile before the profile goes.
    let released = bot
        .nickname_sync()
        .release_profile(ctx.author_id, profile.id)
        .await?;

    let mut message = if bot.database.unlink(profile.id).await? {
        tracing::info!(profile = %profile.id, "unlinked a profile");
        format!("Unlinked **{}**.", describe_profile(&profile))
    } else {
        "That profile no longer exists.".to_string()
    };
    match released {
        UnbindOutcome::NotBound => {}
        UnbindOutcome::Unbound { failure: None } => {
            message.push_str(" Its ratings were removed from your nickname.");
        }
        UnbindOutcome::Unbound { failure: Some(err) } => {
            message.push_str(&format!(
                " Its ratings will no longer be shown, but I could not reset your nickname: {}",
                explain_mutation(&err)
            ));
        }
    }
    ctx.respond(bot).content(&message).await?;

    Ok(())
}
