//! HTTP gateway client for the content-addressable store.
//!
//! Resolves an address with `GET {base_url}/{address}` and parses the body
//! as JSON. The gateway is shape-agnostic; callers decide whether the
//! payload is a history record or an image list.

use std::time::Duration;

use async_trait::async_trait;
use mangaledger_core::address::ContentAddress;

use crate::source::{ContentSource, FetchError};

/// Public gateway used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";

/// Per-fetch timeout used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for a content gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL, e.g. `https://ipfs.io/ipfs/`.
    pub base_url: String,
    /// Timeout for a single fetch. A timeout is reported like any other
    /// request failure.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GATEWAY_URL.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// HTTP client for a single content gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a client with its own connection pool and timeout.
    pub fn new(config: &GatewayConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full gateway URL for an address.
    pub fn url_for(&self, address: &ContentAddress) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), address)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, returning a
    /// [`FetchError::Status`] with the body text otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentSource for GatewayClient {
    async fn fetch_json(&self, address: &ContentAddress) -> Result<serde_json::Value, FetchError> {
        let url = self.url_for(address);
        tracing::debug!(%address, %url, "Fetching content from gateway");

        let response = self.client.get(&url).send().await?;
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}
