//! In-memory content store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mangaledger_core::address::ContentAddress;
use serde_json::Value;

use crate::source::{ContentSource, FetchError};

/// A fixed address-to-payload map.
///
/// Unknown addresses fail with [`FetchError::NotFound`]. Every call is
/// counted so tests can assert how often the store was hit.
#[derive(Debug, Default)]
pub struct MemorySource {
    entries: HashMap<ContentAddress, Value>,
    calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the payload stored at `address`.
    pub fn with_entry(mut self, address: ContentAddress, payload: Value) -> Self {
        self.entries.insert(address, payload);
        self
    }

    pub fn insert(&mut self, address: ContentAddress, payload: Value) {
        self.entries.insert(address, payload);
    }

    /// Number of `fetch_json` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn fetch_json(&self, address: &ContentAddress) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.entries
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(address.clone()))
    }
}
