//! Typed content fetches.
//!
//! [`ContentFetcher`] never fails: an absent address, a transport error, an
//! unparseable payload or a payload of the wrong shape is logged and turned
//! into `None` (records) or an empty list (images). Callers treat those as
//! "no data available".

use std::sync::Arc;

use mangaledger_core::address::ContentAddress;
use mangaledger_core::image::{self, ImageRecord, ReaderPage, SkippedEntry};
use mangaledger_core::record::HistoryRecord;
use serde_json::Value;

use crate::gateway::{GatewayClient, GatewayConfig};
use crate::source::{ContentSource, FetchError};

/// Fetches and parses single payloads from a [`ContentSource`].
///
/// Cheap to clone; clones share the underlying source.
#[derive(Clone)]
pub struct ContentFetcher {
    source: Arc<dyn ContentSource>,
    gateway_base_url: String,
}

impl ContentFetcher {
    /// Create a fetcher over any source.
    ///
    /// `gateway_base_url` is used to turn bare image addresses into
    /// absolute URLs.
    pub fn new(source: Arc<dyn ContentSource>, gateway_base_url: impl Into<String>) -> Self {
        Self {
            source,
            gateway_base_url: gateway_base_url.into(),
        }
    }

    /// Create a fetcher backed by an HTTP gateway.
    pub fn from_gateway(config: &GatewayConfig) -> Result<Self, FetchError> {
        let client = GatewayClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.base_url.clone()))
    }

    pub fn gateway_base_url(&self) -> &str {
        &self.gateway_base_url
    }

    /// Fetch the history record at `address`.
    ///
    /// Returns `None` without touching the source when `address` is `None`.
    pub async fn fetch_record(&self, address: Option<&ContentAddress>) -> Option<HistoryRecord> {
        let address = address?;
        let payload = self.fetch_payload(address).await?;

        let raw_previous = payload
            .get("previousVersion")
            .and_then(Value::as_str)
            .filter(|raw| !raw.trim().is_empty())
            .map(str::to_owned);

        match serde_json::from_value::<HistoryRecord>(payload) {
            Ok(record) => {
                if let (Some(raw), None) = (&raw_previous, &record.previous_version) {
                    tracing::warn!(
                        %address,
                        previous_version = %raw,
                        "Malformed previousVersion, treating record as chain root",
                    );
                }
                let unparsed = record.unparsed_changes();
                if unparsed > 0 {
                    tracing::warn!(%address, unparsed, "Keeping unrecognised change entries raw");
                }
                Some(record)
            }
            Err(e) => {
                tracing::warn!(%address, error = %e, "Payload is not a history record");
                None
            }
        }
    }

    /// Fetch a history record by its raw wire address.
    ///
    /// The empty string and malformed addresses yield `None` without a fetch.
    pub async fn fetch_record_str(&self, raw: &str) -> Option<HistoryRecord> {
        let address = self.parse_address(raw)?;
        self.fetch_record(Some(&address)).await
    }

    /// Fetch a chapter image list, normalized and sorted by page.
    pub async fn fetch_images(&self, address: Option<&ContentAddress>) -> Vec<ImageRecord> {
        let Some(address) = address else {
            return Vec::new();
        };
        let Some(payload) = self.fetch_payload(address).await else {
            return Vec::new();
        };

        let Some(parsed) = image::parse_image_list(&payload, &self.gateway_base_url) else {
            tracing::warn!(%address, "Payload is not an image list");
            return Vec::new();
        };

        for skipped in &parsed.skipped {
            match skipped {
                SkippedEntry::NotAnObject(index) => {
                    tracing::warn!(%address, index, "Dropping image entry that is not an object");
                }
                SkippedEntry::MissingUrl(index) => {
                    tracing::warn!(%address, index, "Dropping image entry without a URL");
                }
            }
        }

        parsed.images
    }

    /// Fetch an image list by its raw wire address.
    pub async fn fetch_images_str(&self, raw: &str) -> Vec<ImageRecord> {
        match self.parse_address(raw) {
            Some(address) => self.fetch_images(Some(&address)).await,
            None => Vec::new(),
        }
    }

    /// Fetch an image list and renumber it for the reader.
    pub async fn fetch_reader_pages(&self, address: Option<&ContentAddress>) -> Vec<ReaderPage> {
        image::renumber_pages(&self.fetch_images(address).await)
    }

    // ---- private helpers ----

    async fn fetch_payload(&self, address: &ContentAddress) -> Option<Value> {
        match self.source.fetch_json(address).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!(%address, error = %e, "Content fetch failed");
                None
            }
        }
    }

    fn parse_address(&self, raw: &str) -> Option<ContentAddress> {
        match ContentAddress::parse_optional(raw) {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed content address");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
