//! MEGA command API client with request/response envelope handling.

use std::sync::atomic::{AtomicU32, Ordering};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{MegaError, Result};
use crate::http::HttpClient;

/// MEGA command API client.
///
/// Each call posts exactly one command wrapped in a JSON array and unwraps the
/// single-element array the server answers with. The request id is an atomic
/// counter seeded randomly per client, so concurrent calls through a shared
/// client never reuse an id.
#[derive(Debug)]
pub struct ApiClient {
    http: HttpClient,
    api_url: String,
    request_id: AtomicU32,
}

impl ApiClient {
    /// Create a new API client against the public endpoint.
    pub fn new() -> Self {
        Self::with_http(HttpClient::new(), &ClientConfig::default())
    }

    /// Create an API client from configuration.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::with_http(HttpClient::with_config(config)?, config))
    }

    pub(crate) fn with_http(http: HttpClient, config: &ClientConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            request_id: AtomicU32::new(rand::random()),
        }
    }

    /// Reserve the next request id.
    pub fn next_request_id(&self) -> u32 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Send one command and parse the unwrapped response as `R`.
    ///
    /// `query` is appended to the endpoint URL after the request id.
    ///
    /// A response whose interior is a bare integer is an API error code and
    /// fails with [`MegaError::ApiError`]. Transport failures, non-2xx
    /// statuses and malformed bodies are returned as they occur. Nothing is
    /// retried.
    pub async fn request<C, R>(&self, command: &C, query: &[(&str, &str)]) -> Result<R>
    where
        C: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(&[command])?;
        let url = self.command_url(query)?;

        debug!(url = %url, body = %body, "api request");
        let response = self.http.post(url.as_str(), body).await?;
        debug!(bytes = response.len(), "api response");

        parse_envelope(&response)
    }

    fn command_url(&self, query: &[(&str, &str)]) -> Result<Url> {
        let id = self.next_request_id().to_string();
        let params = std::iter::once(("id", id.as_str())).chain(query.iter().copied());
        Url::parse_with_params(&format!("{}/cs", self.api_url), params)
            .map_err(|e| MegaError::Decode(format!("invalid API URL {}: {}", self.api_url, e)))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the enclosing `[` `]` and parse the single response object.
pub(crate) fn parse_envelope<R: DeserializeOwned>(body: &str) -> Result<R> {
    let trimmed = body.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    match serde_json::from_str(inner) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            if let Ok(code) = inner.trim().parse::<i64>() {
                warn!(code, "api returned error code");
                return Err(MegaError::ApiError);
            }
            Err(err.into())
        }
    }
}
