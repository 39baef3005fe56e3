//! Content-addressable store client.
//!
//! - [`ContentSource`]: transport seam returning the raw JSON stored at an
//!   address.
//! - [`GatewayClient`]: HTTP gateway implementation backed by [`reqwest`].
//! - [`MemorySource`]: in-memory store for tests and preloaded data.
//! - [`CachedSource`]: bounded LRU memo of successful fetches; addresses
//!   are immutable so a cached payload never goes stale.
//! - [`ContentFetcher`]: typed, failure-absorbing fetches of history
//!   records and chapter image lists.

pub mod cache;
pub mod fetcher;
pub mod gateway;
pub mod memory;
pub mod source;

pub use cache::{CachedSource, DEFAULT_CACHE_CAPACITY};
pub use fetcher::ContentFetcher;
pub use gateway::{GatewayClient, GatewayConfig};
pub use memory::MemorySource;
pub use source::{ContentSource, FetchError};
