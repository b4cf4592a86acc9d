use async_trait::async_trait;
use overbot_core::{
    error::OverError,
    selector::{Choice, ChoiceOption, ChoiceRequest, ProfileChooser},
};
use overbot_models::discord::{
    application::interaction::InteractionData,
    channel::message::{
        component::{ActionRow, SelectMenu, SelectMenuOption, SelectMenuType},
        Component,
    },
};

use crate::{
    context::{BotContext, CommandContext},
    menu::{clear_components, wait_for_author, Waited},
};

/// Asks for a choice with a select menu attached to the command's response.
pub struct StandbyChooser<'a> {
    pub bot: &'a BotContext,
    pub ctx: &'a CommandContext,
}

#[async_trait]
impl ProfileChooser for StandbyChooser<'_> {
    #[tracing::instrument(skip_all, fields(requester = %request.requester))]
    async fn choose(&self, request: ChoiceRequest) -> Result<Choice, OverError> {
        let custom_id = format!("profile-select-{}", self.ctx.interaction_id);
        let menu = [select_menu(custom_id, &request.options)];
        let message = self
            .ctx
            .respond(self.bot)
            .content(&request.prompt)
            .components(&menu)
            .await?;

        let cancel = self.bot.open_menu(request.requester);
        let waited = wait_for_author(
            self.bot,
            message.id,
            request.requester,
            request.timeout,
            &cancel,
        )
        .await;
        self.bot.close_menu(request.requester, &cancel);
        clear_components(self.bot, &self.ctx.interaction_token, message.id).await;

        let choice = match waited {
            Waited::Interaction(interaction) => match interaction.data {
                Some(InteractionData::MessageComponent(data)) => data
                    .values
                    .into_iter()
                    .next()
                    .map_or(Choice::TimedOut, Choice::Selected),
                _ => Choice::TimedOut,
            },
            Waited::TimedOut => Choice::TimedOut,
            Waited::Superseded => Choice::Superseded,
        };
        tracing::debug!(choice = ?choice);
        Ok(choice)
    }
}

fn select_menu(custom_id: String, options: &[ChoiceOption]) -> Component {
    let options = options
        .iter()
        .map(|option| SelectMenuOption {
            default: false,
            description: option.description.clone(),
            emoji: None,
            label: option.label.clone(),
            value: option.value.clone(),
        })
        .collect();

    Component::ActionRow(ActionRow {
        id: None,
        components: vec![Component::SelectMenu(SelectMenu {
            id: None,
            channel_types: None,
            custom_id,
            default_values: None,
            disabled: false,
            kind: SelectMenuType::Text,
            max_values: Some(1),
            min_values: Some(1),
            options: Some(options),
            placeholder: Some("Select a profile".into()),
            required: None,
        })],
    })
}
