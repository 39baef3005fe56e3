//! On-chain anchor events.
//!
//! An anchor event records "entity X's latest history record is now at
//! address Y". The newest anchor for an entity is the entry point into its
//! history chain.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::address::ContentAddress;
use crate::types::{DbId, Timestamp};

/// One anchor emitted by the history contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorEvent {
    pub entity_id: DbId,
    pub content_address: ContentAddress,
    pub timestamp: Timestamp,
    pub block_number: u64,
    /// Position of the event inside its block.
    #[serde(default)]
    pub log_index: u64,
}

impl AnchorEvent {
    /// Compare two events by their position in the chain.
    pub fn chain_order(&self, other: &Self) -> Ordering {
        (self.block_number, self.log_index).cmp(&(other.block_number, other.log_index))
    }
}

/// Sort events newest first.
pub fn sort_newest_first(events: &mut [AnchorEvent]) {
    events.sort_by(|a, b| b.chain_order(a));
}

/// The most recent event, if any.
pub fn latest(events: &[AnchorEvent]) -> Option<&AnchorEvent> {
    events.iter().max_by(|a, b| a.chain_order(b))
}
