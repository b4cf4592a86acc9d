mod graph;
mod link;
mod list;
mod nickname;
mod ratings;
mod unlink;
mod update;

use overbot_core::{
    error::{ErrorKind as CoreErrorKind, OverError},
    nickname::{MutationError, MutationErrorKind},
    profiles::ProfileStore,
    selector::SelectError,
};
use overbot_framework::prelude::*;
use overbot_models::{
    discord::application::interaction::application_command::CommandDataOption,
    id::UserId,
    profile::{Platform, Profile},
    rating::Ratings,
};
use overbot_overwatch::error::{ErrorKind as OverwatchErrorKind, OverwatchError};
use std::error::Error as StdError;

pub use graph::profile_graph;
pub use link::profile_link;
pub use list::profile_list;
pub use nickname::profile_nickname;
pub use ratings::profile_ratings;
pub use unlink::profile_unlink;
pub use update::profile_update;

/// Arguments of the commands that look at another member's profiles.
#[derive(Debug)]
pub struct MemberArguments {
    pub member: Option<UserId>,
}

impl Arguments for MemberArguments {
    fn from_interaction(options: &[CommandDataOption]) -> Result<Self, ArgumentError> {
        Ok(Self {
            member: optional(options, "member")?,
        })
    }
}

/// Arguments naming a profile on a platform.
#[derive(Debug)]
pub struct ProfileArguments {
    pub platform: Platform,
    pub username: String,
}

impl Arguments for ProfileArguments {
    fn from_interaction(options: &[CommandDataOption]) -> Result<Self, ArgumentError> {
        let username: String = required(options, "username")?;
        if username.is_empty() {
            return Err(ArgumentError::BadArgument(
                "The username must not be empty.".into(),
            ));
        }
        Ok(Self {
            platform: required(options, "platform")?,
            username,
        })
    }
}

/// Replies and returns false if `owner` has no linked profile.
async fn has_profile(
    bot: &BotContext,
    ctx: &CommandContext,
    owner: UserId,
) -> Result<bool, FrameworkError> {
    if bot.database.profile_count(owner).await? > 0 {
        return Ok(true);
    }

    let message = if owner == ctx.author_id {
        "You have no linked profiles. Use `/profile link` to link one.".to_string()
    } else {
        format!("<@{owner}> has no linked profiles.")
    };
    ctx.respond(bot).content(&message).await?;
    Ok(false)
}

/// Lets the author pick one of `owner`'s profiles. Replies and returns None if
/// nothing was picked.
async fn select(
    bot: &BotContext,
    ctx: &CommandContext,
    owner: UserId,
    prompt: &str,
) -> Result<Option<Profile>, FrameworkError> {
    let chooser = StandbyChooser { bot, ctx };
    match bot.selector(&chooser).select(ctx.author_id, owner, prompt).await {
        Ok(profile) => Ok(Some(profile)),
        Err(SelectError::NoSelectionMade) => {
            tracing::debug!("no profile was selected");
            ctx.respond(bot).content("No profile was selected.").await?;
            Ok(None)
        }
        Err(SelectError::Generic(err)) => Err(err.into()),
    }
}

/// Whether the stats provider has no such player.
fn is_not_found(err: &OverError) -> bool {
    matches!(err.kind(), CoreErrorKind::Overwatch)
        && err
            .source()
            .and_then(|source| source.downcast_ref::<OverwatchError>())
            .is_some_and(|err| matches!(err.kind(), OverwatchErrorKind::NotFound))
}

const PRIVATE_PROFILE: &str = "This profile is private. Set your career profile to public in the game's social settings and try again.";

fn not_found(profile: &Profile) -> String {
    format!(
        "I could not find **{}** on {}. Check the spelling with `/profile update`.",
        profile.username,
        profile.platform.display_name()
    )
}

/// One line per role, in the order roles are always listed.
fn describe_ratings(ratings: &Ratings) -> String {
    if ratings.is_unranked() {
        return "Unranked".into();
    }
    ratings
        .iter()
        .map(|(role, rating)| format!("{} **{role}:** {rating}", role.glyph()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Why a nickname could not be changed, in words the member can act on.
fn explain_mutation(err: &MutationError) -> &'static str {
    match err.kind() {
        MutationErrorKind::Forbidden => {
            "I need the Manage Nicknames permission and a role above your highest role."
        }
        MutationErrorKind::RateLimited => {
            "Discord is limiting nickname changes. It will be updated the next time you check your ratings."
        }
        MutationErrorKind::Unexpected => "something unexpected went wrong.",
    }
}

fn describe_profile(profile: &Profile) -> String {
    format!("{} ({})", profile.username, profile.platform.display_name())
}
