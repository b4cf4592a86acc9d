use async_trait::async_trait;
use overbot_core::nickname::{DisplayNameMutator, MutationError, MutationErrorKind};
use overbot_models::id::{GuildId, UserId};
use std::sync::Arc;
use twilight_http::{error::ErrorType, Client as TwilightClient};

/// Changes nicknames through the Discord REST API.
#[derive(Clone)]
pub struct DiscordNicknames {
    pub http: Arc<TwilightClient>,
}

#[async_trait]
impl DisplayNameMutator for DiscordNicknames {
    async fn set_display_name(
        &self,
        account: UserId,
        guild: GuildId,
        name: Option<&str>,
    ) -> Result<(), MutationError> {
        if let Some(name) = name {
            twilight_validate::request::nickname(name).map_err(|err| {
                MutationError::new(MutationErrorKind::Unexpected, Some(Box::new(err)))
            })?;
        }

        self.http
            .update_guild_member(guild.0, account.0)
            .nick(name)
            .await
            .map_err(|err| {
                let kind = match err.kind() {
                    ErrorType::Response { status, .. } => kind_for_status(status.get()),
                    _ => MutationErrorKind::Unexpected,
                };
                MutationError::new(kind, Some(Box::new(err)))
            })?;

        Ok(())
    }
}

/// 403 covers both a missing permission and a member above the bot in the role
/// hierarchy, which includes the guild owner.
const fn kind_for_status(status: u16) -> MutationErrorKind {
    match status {
        403 => MutationErrorKind::Forbidden,
        429 => MutationErrorKind::RateLimited,
        _ => MutationErrorKind::Unexpected,
    }
}
