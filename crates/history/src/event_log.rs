//! Anchor event log seam.
//!
//! The event log is the only way to find the newest history record of an
//! entity without already knowing its address. Unlike content fetches, its
//! failures are hard errors: without an anchor there is nothing to fetch.

use std::collections::HashMap;

use async_trait::async_trait;
use mangaledger_core::anchor::AnchorEvent;
use mangaledger_core::types::DbId;

/// Errors from the anchor event log.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// Endpoint or contract address missing from configuration.
    #[error("Event log not configured: {0}")]
    NotConfigured(String),

    /// The log could not be reached.
    #[error("Event log connection failed: {0}")]
    Connection(String),

    /// The HTTP request failed after the connection was established.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The log returned a non-2xx status code.
    #[error("Event log error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body is not a list of anchor events.
    #[error("Invalid event log response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of anchor events for an entity.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// All anchor events recorded for `entity_id`, in any order.
    async fn query_events_by_entity_id(
        &self,
        entity_id: DbId,
    ) -> Result<Vec<AnchorEvent>, EventLogError>;
}

/// In-memory event log.
///
/// Built with [`MemoryEventLog::unreachable`] it fails every query, which
/// models a log that cannot be connected to.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: HashMap<DbId, Vec<AnchorEvent>>,
    unreachable: bool,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log whose every query fails with [`EventLogError::Connection`].
    pub fn unreachable() -> Self {
        Self {
            events: HashMap::new(),
            unreachable: true,
        }
    }

    /// Record an event under its entity id.
    pub fn with_event(mut self, event: AnchorEvent) -> Self {
        self.events.entry(event.entity_id).or_default().push(event);
        self
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn query_events_by_entity_id(
        &self,
        entity_id: DbId,
    ) -> Result<Vec<AnchorEvent>, EventLogError> {
        if self.unreachable {
            return Err(EventLogError::Connection(
                "in-memory event log is unreachable".to_string(),
            ));
        }
        Ok(self.events.get(&entity_id).cloned().unwrap_or_default())
    }
}

/// Event log used when no indexer is configured.
///
/// Every query fails with [`EventLogError::NotConfigured`], so entity
/// lookups report the log as unavailable while address-based lookups keep
/// working.
#[derive(Debug, Clone)]
pub struct DisabledEventLog {
    reason: String,
}

impl DisabledEventLog {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EventLog for DisabledEventLog {
    async fn query_events_by_entity_id(
        &self,
        _entity_id: DbId,
    ) -> Result<Vec<AnchorEvent>, EventLogError> {
        Err(EventLogError::NotConfigured(self.reason.clone()))
    }
}
