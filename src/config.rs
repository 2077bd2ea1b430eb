//! Client configuration.

use std::time::Duration;

/// Default MEGA command API endpoint. Commands are posted to `<api_url>/cs`.
pub const DEFAULT_API_URL: &str = "https://g.api.mega.co.nz";

/// Settings shared by the command API client and content downloads.
///
/// The defaults reproduce the plain protocol behaviour: the public endpoint,
/// no proxy, no deadlines and no MAC verification.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use megalink::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_timeout(Duration::from_secs(30))
///     .with_mac_verification(true);
/// assert!(config.verify_mac);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the command API, without the `/cs` path.
    pub api_url: String,
    /// Proxy URL (e.g. "http://proxy:8080" or "socks5://proxy:1080").
    pub proxy: Option<String>,
    /// Deadline for each API command and for opening a content download.
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Check downloaded content against the MAC carried in the key material.
    pub verify_mac: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            proxy: None,
            timeout: None,
            verify_mac: false,
        }
    }
}

impl ClientConfig {
    /// Use a different command API endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Route all requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Apply a deadline to API commands and download start-up.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable content MAC verification.
    pub fn with_mac_verification(mut self, verify: bool) -> Self {
        self.verify_mac = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.proxy.is_none());
        assert!(config.timeout.is_none());
        assert!(!config.verify_mac);
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let config = ClientConfig::default().with_api_url("http://127.0.0.1:8080/");
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }
}
