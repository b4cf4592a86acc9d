#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::similar_names, clippy::module_name_repetitions)]

pub mod arguments;
pub mod chooser;
pub mod context;
pub mod error;
mod menu;
pub mod nicknames;
pub mod prelude;
pub mod prompt;
pub mod verify;

use overbot_models::{
    discord::application::interaction::{
        application_command::{CommandDataOption, CommandOptionValue},
        Interaction, InteractionData,
    },
    id::{GuildId, UserId},
};
use std::{error::Error as StdError, sync::atomic::AtomicBool};

use crate::{
    arguments::ArgumentError,
    context::{BotContext, CommandContext},
    error::{ErrorKind, FrameworkError},
};

impl CommandContext {
    /// Builds the context of an application command interaction.
    ///
    /// # Errors
    ///
    /// Returns Err if the interaction is not an application command or has no author.
    pub fn from_interaction(interaction: Interaction) -> Result<Self, FrameworkError> {
        let (author_id, author_name) = match interaction.author() {
            Some(user) => (UserId(user.id), user.name.clone()),
            None => return Err(ArgumentError::Missing("user").into()),
        };

        let Some(InteractionData::ApplicationCommand(data)) = interaction.data else {
            return Err(ArgumentError::BadArgument("not an application command".into()).into());
        };
        let (name, options) = skip_subcommands(data.name, data.options);

        Ok(CommandContext {
            name,
            guild_id: interaction.guild_id.map(GuildId),
            author_id,
            author_name,
            interaction_id: interaction.id,
            interaction_token: interaction.token,
            options,
            callback_invoked: AtomicBool::new(false),
        })
    }
}

/// Appends every subcommand (group) name to `path` and returns the options of
/// the innermost one.
fn skip_subcommands(
    mut path: String,
    options: Vec<CommandDataOption>,
) -> (String, Vec<CommandDataOption>) {
    if let Some(option) = options.first() {
        match &option.value {
            CommandOptionValue::SubCommand(inner) | CommandOptionValue::SubCommandGroup(inner) => {
                path.push(' ');
                path.push_str(&option.name);
                return skip_subcommands(path, inner.clone());
            }
            _ => {}
        }
    }

    (path, options)
}

pub async fn handle_error(bot: &BotContext, ctx: &CommandContext, err: FrameworkError) {
    let message = match err.kind() {
        ErrorKind::Argument => {
            tracing::debug!(name = ?ctx.name, err = %err);
            err.source()
                .map_or_else(|| err.to_string(), ToString::to_string)
        }
        _ => {
            tracing::error!(name = ?ctx.name, err = ?err);
            "Something went wrong. Please try again. If the issue persists, please contact the support server.".to_string()
        }
    };
    let _ = ctx.respond(bot).content(&message).ephemeral().await;
}

/// Runs a command in the background: parses its arguments from the context's
/// options, calls the function and reports any error back to the author.
#[macro_export]
macro_rules! spawn_command {
    ($bot:expr, $ctx:expr, $func:path) => {{
        let bot = $bot.clone();
        let ctx: $crate::context::CommandContext = $ctx;
        ::tokio::spawn(async move {
            let res = match $crate::arguments::Arguments::from_interaction(&ctx.options) {
                Ok(args) => $func(&bot, &ctx, args).await,
                Err(err) => Err(err.into()),
            };
            if let Err(err) = res {
                $crate::handle_error(&bot, &ctx, err).await;
            }
        });
    }};
}
