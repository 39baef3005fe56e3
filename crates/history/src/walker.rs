//! History chain traversal.
//!
//! A history chain is walked strictly sequentially: each step needs the
//! `previousVersion` of the record fetched in the step before. The walk
//! stops at the root, on a repeated version, on a version that does not
//! decrease, at the record ceiling, or at the first unavailable record.
//! None of these are errors; the records gathered so far are returned.
//!
//! Separate walks share nothing but the content source, so any number of
//! them may run concurrently.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use mangaledger_content::ContentFetcher;
use mangaledger_core::address::ContentAddress;
use mangaledger_core::anchor::{self, AnchorEvent};
use mangaledger_core::diff::{self, ImageComparison, SideBySideRow};
use mangaledger_core::image::ImageRecord;
use mangaledger_core::pagination::{self, Page};
use mangaledger_core::record::HistoryRecord;
use mangaledger_core::types::DbId;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::event_log::{EventLog, EventLogError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on the number of records a single walk collects. The chain
/// has no independent length bound, so a corrupted chain must not hang the
/// caller.
pub const MAX_HISTORY_RECORDS: usize = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tunable limits for a history walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Stop once this many records have been collected.
    pub max_records: usize,
    /// Stop when a record's version is not strictly lower than the version
    /// of the record that pointed to it.
    pub enforce_monotonic_versions: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_records: MAX_HISTORY_RECORDS,
            enforce_monotonic_versions: true,
        }
    }
}

/// An anchor event together with the record it points to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRecord {
    pub event: AnchorEvent,
    /// `None` when the record could not be fetched.
    pub record: Option<HistoryRecord>,
}

/// Why a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkEnd {
    Root,
    Unavailable,
    Cycle,
    NonMonotonic,
    Ceiling,
}

// ---------------------------------------------------------------------------
// HistoryWalker
// ---------------------------------------------------------------------------

/// Reconstructs entity histories from the content store and event log.
///
/// Cheap to clone; clones share the fetcher's source and the event log.
#[derive(Clone)]
pub struct HistoryWalker {
    fetcher: ContentFetcher,
    event_log: Arc<dyn EventLog>,
    options: WalkOptions,
}

impl HistoryWalker {
    pub fn new(fetcher: ContentFetcher, event_log: Arc<dyn EventLog>) -> Self {
        Self::with_options(fetcher, event_log, WalkOptions::default())
    }

    pub fn with_options(
        fetcher: ContentFetcher,
        event_log: Arc<dyn EventLog>,
        options: WalkOptions,
    ) -> Self {
        Self {
            fetcher,
            event_log,
            options,
        }
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    /// Fetch the record stored at `address`.
    pub async fn get_by_address(&self, address: &ContentAddress) -> Option<HistoryRecord> {
        self.fetcher.fetch_record(Some(address)).await
    }

    /// Walk the chain starting at `latest`, newest record first.
    ///
    /// `None` yields an empty history.
    pub async fn walk_full_history(&self, latest: Option<&ContentAddress>) -> Vec<HistoryRecord> {
        self.walk_full_history_until(latest, &CancellationToken::new())
            .await
            .unwrap_or_default()
    }

    /// Walk the chain until it ends or `cancel` fires.
    ///
    /// Returns `None` if cancelled; a fetch in flight at that moment is
    /// abandoned and nothing gathered so far is returned.
    pub async fn walk_full_history_until(
        &self,
        latest: Option<&ContentAddress>,
        cancel: &CancellationToken,
    ) -> Option<Vec<HistoryRecord>> {
        let Some(latest) = latest else {
            return Some(Vec::new());
        };

        let mut visited: HashSet<u64> = HashSet::new();
        let mut records: Vec<HistoryRecord> = Vec::new();
        let mut current = Some(latest.clone());

        let end = loop {
            let Some(address) = current.take() else {
                break WalkEnd::Root;
            };

            if records.len() >= self.options.max_records {
                break WalkEnd::Ceiling;
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(start = %latest, collected = records.len(), "History walk cancelled");
                    return None;
                }
                fetched = self.fetcher.fetch_record(Some(&address)) => fetched,
            };

            let Some(record) = fetched else {
                break WalkEnd::Unavailable;
            };

            if !visited.insert(record.version) {
                tracing::debug!(%address, version = record.version, "Version already visited");
                break WalkEnd::Cycle;
            }

            if self.options.enforce_monotonic_versions {
                if let Some(newer) = records.last() {
                    if record.version >= newer.version {
                        tracing::warn!(
                            %address,
                            version = record.version,
                            newer_version = newer.version,
                            "Version does not decrease along chain",
                        );
                        break WalkEnd::NonMonotonic;
                    }
                }
            }

            current = record.previous_version.clone();
            records.push(record);
        };

        match end {
            WalkEnd::Ceiling => tracing::warn!(
                start = %latest,
                max_records = self.options.max_records,
                "History walk hit record ceiling",
            ),
            _ => tracing::debug!(start = %latest, collected = records.len(), end = ?end, "History walk finished"),
        }

        records.sort_by(|a, b| b.version.cmp(&a.version));
        Some(records)
    }

    /// Fetch the newest record anchored for `entity_id`.
    ///
    /// `Ok(None)` when the entity has no anchors or the anchored record is
    /// unavailable. Event log failures are returned as errors.
    pub async fn get_latest_version_by_entity_id(
        &self,
        entity_id: DbId,
    ) -> Result<Option<HistoryRecord>, EventLogError> {
        let events = self.event_log.query_events_by_entity_id(entity_id).await?;

        let Some(latest) = anchor::latest(&events) else {
            tracing::debug!(entity_id, "No anchor events for entity");
            return Ok(None);
        };

        Ok(self.get_by_address(&latest.content_address).await)
    }

    /// One page of anchor events for `entity_id`, newest first.
    ///
    /// Only event metadata is returned; records are not fetched.
    pub async fn get_paginated_anchor_events(
        &self,
        entity_id: DbId,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Page<AnchorEvent>, EventLogError> {
        let mut events = self.event_log.query_events_by_entity_id(entity_id).await?;
        anchor::sort_newest_first(&mut events);
        Ok(pagination::paginate(events, page, page_size))
    }

    /// One page of anchor events with the record behind each one.
    ///
    /// Records are fetched concurrently.
    pub async fn materialize_anchor_page(
        &self,
        entity_id: DbId,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Page<AnchorRecord>, EventLogError> {
        let events = self
            .get_paginated_anchor_events(entity_id, page, page_size)
            .await?;

        let records = join_all(
            events
                .data
                .iter()
                .map(|event| self.get_by_address(&event.content_address)),
        )
        .await;

        let mut records = records.into_iter();
        Ok(events.map(|event| AnchorRecord {
            event,
            record: records.next().flatten(),
        }))
    }

    /// Fetch two chapter image lists concurrently and compare them.
    pub async fn compare_contents(
        &self,
        old: Option<&ContentAddress>,
        new: Option<&ContentAddress>,
    ) -> ContentComparison {
        let (old_images, new_images) =
            tokio::join!(self.fetcher.fetch_images(old), self.fetcher.fetch_images(new));

        ContentComparison {
            comparison: diff::compare(&old_images, &new_images),
            rows: diff::side_by_side(&old_images, &new_images),
            old_images,
            new_images,
        }
    }
}

/// Both image lists of a comparison together with their diff.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentComparison {
    pub old_images: Vec<ImageRecord>,
    pub new_images: Vec<ImageRecord>,
    #[serde(flatten)]
    pub comparison: ImageComparison,
    /// Full side-by-side listing of both versions.
    pub rows: Vec<SideBySideRow>,
}
