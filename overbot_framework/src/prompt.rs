use overbot_core::error::OverError;
use overbot_models::discord::{
    application::interaction::InteractionData,
    channel::message::{
        component::{ActionRow, Button, ButtonStyle},
        Component,
    },
};

use crate::{
    context::{BotContext, CommandContext},
    menu::{clear_components, wait_for_author, Waited},
};

/// Asks the author to confirm `text`. Anything but a press on the confirm
/// button before the timeout counts as a no.
pub async fn prompt(bot: &BotContext, ctx: &CommandContext, text: &str) -> Result<bool, OverError> {
    let confirm_id = format!("prompt-confirm-{}", ctx.interaction_id);
    let buttons = [confirm_buttons(&confirm_id, &format!("prompt-cancel-{}", ctx.interaction_id))];
    let message = ctx.respond(bot).content(text).components(&buttons).await?;

    let cancel = bot.open_menu(ctx.author_id);
    let waited = wait_for_author(
        bot,
        message.id,
        ctx.author_id,
        bot.settings.select_timeout,
        &cancel,
    )
    .await;
    bot.close_menu(ctx.author_id, &cancel);
    clear_components(bot, &ctx.interaction_token, message.id).await;

    let confirmed = match waited {
        Waited::Interaction(interaction) => matches!(
            interaction.data,
            Some(InteractionData::MessageComponent(data)) if data.custom_id == confirm_id
        ),
        Waited::TimedOut | Waited::Superseded => false,
    };
    tracing::debug!(confirmed);
    Ok(confirmed)
}

fn confirm_buttons(confirm_id: &str, cancel_id: &str) -> Component {
    let button = |custom_id: &str, label: &str, style| {
        Component::Button(Button {
            id: None,
            custom_id: Some(custom_id.to_string()),
            disabled: false,
            emoji: None,
            label: Some(label.to_string()),
            style,
            url: None,
            sku_id: None,
        })
    };

    Component::ActionRow(ActionRow {
        id: None,
        components: vec![
            button(confirm_id, "Confirm", ButtonStyle::Success),
            button(cancel_id, "Cancel", ButtonStyle::Danger),
        ],
    })
}
