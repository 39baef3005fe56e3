//! Memoizing content source.
//!
//! A content address always resolves to the same payload, so a cached
//! payload never goes stale. The cache holds at most `capacity` payloads and
//! evicts the least recently used one when full. Failures are not cached and
//! are retried on the next request.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use mangaledger_core::address::ContentAddress;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::source::{ContentSource, FetchError};

/// Number of payloads kept when no capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Wraps another [`ContentSource`] with a bounded LRU cache.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<LruCache<ContentAddress, Value>>,
}

impl<S: ContentSource> CachedSource<S> {
    pub fn new(inner: S, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Maximum number of cached payloads.
    pub async fn capacity(&self) -> usize {
        self.cache.lock().await.cap().get()
    }

    /// Number of cached payloads.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

#[async_trait]
impl<S: ContentSource> ContentSource for CachedSource<S> {
    async fn fetch_json(&self, address: &ContentAddress) -> Result<Value, FetchError> {
        if let Some(hit) = self.cache.lock().await.get(address) {
            tracing::trace!(%address, "Content cache hit");
            return Ok(hit.clone());
        }

        // The lock is not held across the fetch; concurrent misses on the
        // same address may both reach the inner source.
        let payload = self.inner.fetch_json(address).await?;
        if let Some((evicted, _)) = self
            .cache
            .lock()
            .await
            .push(address.clone(), payload.clone())
            .filter(|(key, _)| key != address)
        {
            tracing::trace!(%evicted, "Content cache eviction");
        }
        Ok(payload)
    }
}
