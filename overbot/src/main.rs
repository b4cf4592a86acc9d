#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value,
    clippy::too_many_lines
)]

mod commands;
mod config;
mod router;

use axum::{routing::post, Extension, Router};
use overbot_database::Database;
use overbot_framework::{
    context::{BotContext, Settings},
    verify::SignatureVerifier,
};
use overbot_models::{discord::id::Id, profile::validate_aliases};
use overbot_overwatch::OverwatchClient;
use std::{error::Error, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use twilight_http::Client as TwilightClient;
use twilight_validate::request::NICKNAME_LIMIT_MAX;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    validate_aliases()?;

    let database = Database::new(&config.database_url)?;
    database.migrate().await?;

    let http = Arc::new(TwilightClient::new(config.discord_token.clone()));
    let verifier = SignatureVerifier::from_hex(&config.discord_public_key)?;

    let bot = BotContext::new(
        http,
        Id::new(config.application_id),
        Arc::new(database),
        OverwatchClient::new(&config.overwatch_url),
        Settings {
            limits: config.limits,
            select_timeout: config.select_timeout,
            nickname_length: NICKNAME_LIMIT_MAX,
        },
    );

    let app = Router::new().route("/", post(router::interactions)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(bot))
            .layer(Extension(verifier)),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening for interactions");
    axum::serve(listener, app).await?;

    Ok(())
}
