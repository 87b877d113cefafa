//! HTTP driver for the regional control API.
//!
//! Each region gets its own [`HttpChannelControl`] rooted at a base URL:
//!
//! ```text
//! POST {base}/prod/channels/{id}/start
//! POST {base}/prod/channels/{id}/stop
//! PUT  {base}/prod/channels/{id}/schedule   (BatchScheduleUpdate JSON)
//! ```
//!
//! Request signing is left to whatever sits at the endpoint (a signing
//! gateway or a local proxy); the driver only attaches an optional bearer
//! token.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::control::{ChannelControl, EndpointResolver};
use crate::error::{ApiError, EndpointError};
use crate::types::BatchScheduleUpdate;

pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://medialive.{region}.amazonaws.com";

// ---------------------------------------------------------------------------
// HttpChannelControl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpChannelControl {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpChannelControl {
    pub fn new(client: Client, base: Url, token: Option<String>) -> Self {
        Self {
            client,
            base,
            token,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn channel_url(&self, channel_id: &str, action: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Rejected(format!("base url {} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(["prod", "channels", channel_id, action]);
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ChannelControl for HttpChannelControl {
    async fn start_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        let url = self.channel_url(channel_id, "start")?;
        self.send(self.client.post(url)).await
    }

    async fn stop_channel(&self, channel_id: &str) -> Result<(), ApiError> {
        let url = self.channel_url(channel_id, "stop")?;
        self.send(self.client.post(url)).await
    }

    async fn update_schedule(
        &self,
        channel_id: &str,
        update: &BatchScheduleUpdate,
    ) -> Result<(), ApiError> {
        let url = self.channel_url(channel_id, "schedule")?;
        let body = serde_json::to_vec(update)?;
        let req = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(req).await
    }
}

// ---------------------------------------------------------------------------
// EndpointSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Base URL with a `{region}` placeholder.
    #[serde(default = "default_template")]
    pub template: String,
    /// Region → base URL, taking precedence over `template`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, String>,
    /// Name of the environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token_env: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

fn default_template() -> String {
    DEFAULT_ENDPOINT_TEMPLATE.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            template: default_template(),
            overrides: BTreeMap::new(),
            auth_token_env: None,
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl EndpointSettings {
    /// The base URL string configured for `region`.
    pub fn url_for(&self, region: &str) -> String {
        match self.overrides.get(region) {
            Some(url) => url.clone(),
            None => self.template.replace("{region}", region),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpEndpointResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HttpEndpointResolver {
    settings: EndpointSettings,
}

impl HttpEndpointResolver {
    pub fn new(settings: EndpointSettings) -> Self {
        Self { settings }
    }

    /// Build the concrete handle for `region`.
    pub fn connect(&self, region: &str) -> Result<HttpChannelControl, EndpointError> {
        if !is_valid_region(region) {
            return Err(EndpointError::InvalidRegion(region.to_string()));
        }

        let raw = self.settings.url_for(region);
        let base = Url::parse(&raw)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && !u.cannot_be_a_base())
            .ok_or_else(|| EndpointError::InvalidUrl {
                region: region.to_string(),
                url: raw.clone(),
            })?;

        let token = match &self.settings.auth_token_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                EndpointError::MissingCredentials {
                    region: region.to_string(),
                    var: var.clone(),
                }
            })?),
            None => None,
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(self.settings.connect_timeout_seconds))
            .user_agent(concat!("liveswitch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| EndpointError::Client {
                region: region.to_string(),
                source,
            })?;

        tracing::debug!(region, base = %base, "resolved endpoint");
        Ok(HttpChannelControl::new(client, base, token))
    }
}

impl EndpointResolver for HttpEndpointResolver {
    fn resolve(&self, region: &str) -> Result<Arc<dyn ChannelControl>, EndpointError> {
        Ok(Arc::new(self.connect(region)?))
    }
}

fn is_valid_region(region: &str) -> bool {
    !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
