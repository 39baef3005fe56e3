//! HTTP client for the anchor event indexer.
//!
//! The indexer watches the history contract and serves its events as JSON:
//! `GET {endpoint}/contracts/{contract}/events?entityId={id}` returns an
//! array of [`AnchorEvent`].

use std::time::Duration;

use async_trait::async_trait;
use mangaledger_core::anchor::AnchorEvent;
use mangaledger_core::types::DbId;

use crate::event_log::{EventLog, EventLogError};

/// Timeout for a single indexer request when none is configured.
pub const DEFAULT_EVENT_LOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the event indexer.
///
/// Both the endpoint and the contract address come from deployment
/// configuration; either may be missing in environments without a chain.
#[derive(Debug, Clone)]
pub struct EventLogConfig {
    pub endpoint: Option<String>,
    pub contract_address: Option<String>,
    pub timeout: Duration,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            contract_address: None,
            timeout: DEFAULT_EVENT_LOG_TIMEOUT,
        }
    }
}

/// Event log backed by the HTTP indexer.
#[derive(Debug, Clone)]
pub struct HttpEventLog {
    client: reqwest::Client,
    endpoint: String,
    contract_address: String,
}

/// Return the trimmed value of an optional setting, or `None` when blank.
fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl HttpEventLog {
    /// Validate the configuration and build the client.
    pub fn connect(config: &EventLogConfig) -> Result<Self, EventLogError> {
        let endpoint = required(config.endpoint.as_deref())
            .ok_or_else(|| EventLogError::NotConfigured("missing endpoint".to_string()))?;
        let contract_address = required(config.contract_address.as_deref())
            .ok_or_else(|| EventLogError::NotConfigured("missing contract address".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EventLogError::Connection(e.to_string()))?;

        tracing::info!(endpoint, contract_address, "Event log client configured");

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            contract_address: contract_address.to_string(),
        })
    }

    /// URL of the events collection for the configured contract.
    pub fn events_url(&self) -> String {
        format!("{}/contracts/{}/events", self.endpoint, self.contract_address)
    }
}

#[async_trait]
impl EventLog for HttpEventLog {
    async fn query_events_by_entity_id(
        &self,
        entity_id: DbId,
    ) -> Result<Vec<AnchorEvent>, EventLogError> {
        let response = self
            .client
            .get(self.events_url())
            .query(&[("entityId", entity_id)])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    EventLogError::Connection(e.to_string())
                } else {
                    EventLogError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EventLogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let events: Vec<AnchorEvent> = serde_json::from_slice(&bytes)?;

        tracing::debug!(entity_id, count = events.len(), "Queried anchor events");
        Ok(events)
    }
}
