use futures_util::StreamExt;
use overbot_models::{
    discord::{
        application::interaction::{Interaction, InteractionType},
        channel::message::{Component, MessageFlags},
        id::{
            marker::{MessageMarker, UserMarker},
            Id,
        },
    },
    id::UserId,
};
use std::time::Duration;
use tokio::{
    sync::Notify,
    time::{timeout_at, Instant},
};

use crate::context::BotContext;

pub(crate) enum Waited {
    Interaction(Interaction),
    TimedOut,
    Superseded,
}

/// Waits for `author` to use a component on `message`. Everyone else is told
/// the menu is not theirs and the wait goes on.
pub(crate) async fn wait_for_author(
    bot: &BotContext,
    message: Id<MessageMarker>,
    author: UserId,
    timeout: Duration,
    cancel: &Notify,
) -> Waited {
    let deadline = Instant::now() + timeout;
    let mut stream = bot
        .standby
        .wait_for_component_stream(message, |interaction: &Interaction| {
            interaction.kind == InteractionType::MessageComponent
        });

    loop {
        let next = tokio::select! {
            () = cancel.notified() => return Waited::Superseded,
            next = timeout_at(deadline, stream.next()) => next,
        };
        let interaction = match next {
            Ok(Some(interaction)) => interaction,
            Ok(None) | Err(_) => return Waited::TimedOut,
        };

        if is_author(interaction.author_id(), author) {
            return Waited::Interaction(interaction);
        }

        let res = bot
            .http
            .interaction(bot.application_id)
            .create_followup(&interaction.token)
            .flags(MessageFlags::EPHEMERAL)
            .content("This menu can only be used by the member who opened it.")
            .await;
        if let Err(err) = res {
            tracing::error!(err = ?err, "could not reject a foreign menu interaction");
        }
    }
}

/// Whether a component was used by the member the menu belongs to.
fn is_author(actor: Option<Id<UserMarker>>, author: UserId) -> bool {
    actor == Some(author.0)
}

/// Removes every component from a message sent for the interaction `token`.
pub(crate) async fn clear_components(bot: &BotContext, token: &str, message: Id<MessageMarker>) {
    let empty: &[Component] = &[];
    let res = bot
        .http
        .interaction(bot.application_id)
        .update_followup(token, message)
        .components(Some(empty))
        .await;
    if let Err(err) = res {
        tracing::error!(err = ?err, "could not remove the menu");
    }
}
