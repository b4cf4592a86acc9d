#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

pub mod error;
pub mod model;
mod route;

use http_body_util::{BodyExt, Full};
use hyper::{
    body::Bytes,
    header::{HeaderValue, ACCEPT, USER_AGENT},
    http::response::Parts,
    Method, Request as HyperRequest, StatusCode,
};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use overbot_models::profile::Platform;

use crate::{
    error::{DeserializeBodyError, ErrorKind, OverwatchError},
    model::PlayerProfile,
    route::Route,
};

pub const DEFAULT_BASE_URL: &str = "https://ow-api.com/v1/stats";

#[derive(Clone)]
pub struct OverwatchClient {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: String,
}

impl OverwatchClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let client = HyperClient::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    /// Gets the public profile of a player, including their role ratings.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotFound`] when the provider does not know the player.
    /// See [`OverwatchError`] for the other cases.
    pub async fn get_profile(
        &self,
        platform: Platform,
        username: &str,
    ) -> Result<PlayerProfile, OverwatchError> {
        let route = Route::Profile {
            base: &self.base_url,
            platform,
            username,
        }
        .url()
        .map_err(|source| OverwatchError {
            source: Some(Box::new(source)),
            kind: ErrorKind::BuildingRequest,
        })?;

        let request = HyperRequest::builder()
            .uri(route.as_str())
            .method(Method::GET)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static("overbot"))
            .body(Full::default())
            .map_err(|source| OverwatchError {
                source: Some(Box::new(source)),
                kind: ErrorKind::BuildingRequest,
            })?;

        let (parts, bytes) = self.request(request).await?;

        if parts.status == StatusCode::NOT_FOUND {
            tracing::debug!(route = %route, "player not found");
            return Err(OverwatchError {
                source: None,
                kind: ErrorKind::NotFound,
            });
        }

        if !parts.status.is_success() {
            return Err(OverwatchError {
                source: None,
                kind: ErrorKind::Response {
                    route: route.path().to_string(),
                    status: parts.status,
                    bytes,
                },
            });
        }

        let json = serde_json::from_slice::<PlayerProfile>(&bytes).map_err(|source| {
            OverwatchError {
                source: Some(Box::new(DeserializeBodyError {
                    source: Some(Box::new(source)),
                    bytes,
                })),
                kind: ErrorKind::Deserialize,
            }
        })?;

        Ok(json)
    }

    async fn request(
        &self,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<(Parts, Vec<u8>), OverwatchError> {
        let res = self
            .client
            .request(request)
            .await
            .map_err(|source| OverwatchError {
                source: Some(Box::new(source)),
                kind: ErrorKind::Sending,
            })?;

        let (parts, body) = res.into_parts();
        let bytes = body
            .collect()
            .await
            .map_err(|source| OverwatchError {
                source: Some(Box::new(source)),
                kind: ErrorKind::ChunkingResponse,
            })?
            .to_bytes();

        Ok((parts, bytes.into()))
    }
}
