//! HTTP client wrapper for MEGA API requests and content downloads.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response};

use crate::config::ClientConfig;
use crate::error::{MegaError, Result};

/// HTTP client for making requests to MEGA servers.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client without proxy or deadlines.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: None,
        }
    }

    /// Create a client from configuration. Fails on an invalid proxy URL.
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
            timeout: config.timeout,
        })
    }

    /// Make a POST request with JSON body.
    ///
    /// # Returns
    /// Response body as string
    pub async fn post(&self, url: &str, body: String) -> Result<String> {
        self.deadline(async {
            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .body(body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(MegaError::HttpError(response.status().as_u16()));
            }

            Ok(response.text().await?)
        })
        .await
    }

    /// Start a GET request and return the response once headers arrive.
    ///
    /// The body is left unread so callers can stream it.
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.deadline(async {
            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(MegaError::HttpError(response.status().as_u16()));
            }
            Ok(response)
        })
        .await
    }

    async fn deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await?,
            None => fut.await,
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let _client = HttpClient::new();
        let _default = HttpClient::default();
    }

    #[test]
    fn test_proxy_creation() {
        let config = ClientConfig::default().with_proxy("http://127.0.0.1:8080");
        assert!(HttpClient::with_config(&config).is_ok());
    }

    #[test]
    fn test_proxy_invalid() {
        let config = ClientConfig::default().with_proxy(":::::::");
        assert!(HttpClient::with_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(10));
        let client = HttpClient::with_config(&config).unwrap();
        let result: Result<()> = client
            .deadline(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(MegaError::Timeout)));
    }
}
