use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use overbot_framework::{
    context::{BotContext, CommandContext},
    verify::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER},
};
use overbot_models::discord::{
    application::interaction::{Interaction, InteractionType},
    gateway::{event::Event, payload::incoming::InteractionCreate},
    http::interaction::{InteractionResponse, InteractionResponseType},
};

use crate::commands;

/// The interactions endpoint. Every request must carry a valid signature.
pub async fn interactions(
    Extension(bot): Extension<BotContext>,
    Extension(verifier): Extension<SignatureVerifier>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER))
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if let Err(err) = verifier.verify(signature, timestamp, &body) {
        tracing::debug!(err = %err, "rejected an unsigned interaction");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let interaction = match serde_json::from_slice::<Interaction>(&body) {
        Ok(interaction) => interaction,
        Err(err) => {
            tracing::warn!(err = %err, "could not parse an interaction");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match interaction.kind {
        InteractionType::Ping => reply(InteractionResponseType::Pong),
        InteractionType::MessageComponent => {
            // Menus wait on these through standby and edit their own message.
            bot.standby
                .process(&Event::InteractionCreate(Box::new(InteractionCreate(
                    interaction,
                ))));
            reply(InteractionResponseType::DeferredUpdateMessage)
        }
        InteractionType::ApplicationCommand => match CommandContext::from_interaction(interaction) {
            Ok(ctx) => {
                if commands::dispatch(&bot, ctx) {
                    reply(InteractionResponseType::DeferredChannelMessageWithSource)
                } else {
                    StatusCode::NOT_FOUND.into_response()
                }
            }
            Err(err) => {
                tracing::warn!(err = %err);
                StatusCode::BAD_REQUEST.into_response()
            }
        },
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

fn reply(kind: InteractionResponseType) -> Response {
    Json(InteractionResponse { kind, data: None }).into_response()
}
