use async_trait::async_trait;
use mangaledger_core::address::ContentAddress;

/// Errors from a single content fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Gateway error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The payload is not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Nothing is stored at the address.
    #[error("No content stored at {0}")]
    NotFound(ContentAddress),
}

/// Anything that can resolve a content address to its JSON payload.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_json(&self, address: &ContentAddress) -> Result<serde_json::Value, FetchError>;
}
