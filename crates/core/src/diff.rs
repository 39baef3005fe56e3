//! Version diff engine for chapter image lists.
//!
//! Compares the page images of two chapter versions. The rules are
//! deliberately asymmetric:
//!
//! - `added`     -- positional: every new image at an index past the end of
//!   the old list. An image inserted in the middle is not reported.
//! - `removed`   -- by URL: every old image whose URL appears nowhere in the
//!   new list.
//! - `unchanged` -- by URL: every old image whose URL is still present.
//!
//! Inputs are borrowed and never modified; callers re-read them for the
//! side-by-side listing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::image::ImageRecord;

// ---------------------------------------------------------------------------
// DiffStatus
// ---------------------------------------------------------------------------

/// The status of an item in a diff comparison.
///
/// - `Added`     -- present only in the incoming/new side.
/// - `Removed`   -- present only in the current/old side.
/// - `Changed`   -- same position on both sides but different content.
/// - `Unchanged` -- present on both sides with identical content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Added/removed/common image sets between two versions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageComparison {
    pub added: Vec<ImageRecord>,
    pub removed: Vec<ImageRecord>,
    pub unchanged: Vec<ImageRecord>,
}

impl ImageComparison {
    /// True when the positional and URL rules found nothing to report.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare two image lists.
pub fn compare(old_images: &[ImageRecord], new_images: &[ImageRecord]) -> ImageComparison {
    let new_urls: HashSet<&str> = new_images.iter().map(|image| image.url.as_str()).collect();

    let added = new_images
        .iter()
        .skip(old_images.len())
        .cloned()
        .collect();

    let (unchanged, removed): (Vec<ImageRecord>, Vec<ImageRecord>) = old_images
        .iter()
        .cloned()
        .partition(|image| new_urls.contains(image.url.as_str()));

    ImageComparison {
        added,
        removed,
        unchanged,
    }
}

// ---------------------------------------------------------------------------
// Side-by-side listing
// ---------------------------------------------------------------------------

/// One image on one side of a [`SideBySideRow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEntry {
    pub image: ImageRecord,
    pub status: DiffStatus,
}

/// One position of the full old/new listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBySideRow {
    /// Zero-based position in both lists.
    pub position: usize,
    pub old: Option<SideEntry>,
    pub new: Option<SideEntry>,
}

/// List both versions in full, position by position.
///
/// Old images are `removed` when their URL is gone from the new list and
/// `unchanged` otherwise. New images are `added` past the old length,
/// `unchanged` when the old image at the same position has the same URL,
/// and `changed` otherwise.
pub fn side_by_side(old_images: &[ImageRecord], new_images: &[ImageRecord]) -> Vec<SideBySideRow> {
    let new_urls: HashSet<&str> = new_images.iter().map(|image| image.url.as_str()).collect();
    let rows = old_images.len().max(new_images.len());

    (0..rows)
        .map(|position| {
            let old_image = old_images.get(position);

            let old = old_image.map(|image| SideEntry {
                image: image.clone(),
                status: if new_urls.contains(image.url.as_str()) {
                    DiffStatus::Unchanged
                } else {
                    DiffStatus::Removed
                },
            });

            let new = new_images.get(position).map(|image| SideEntry {
                image: image.clone(),
                status: match old_image {
                    None => DiffStatus::Added,
                    Some(previous) if previous.url == image.url => DiffStatus::Unchanged,
                    Some(_) => DiffStatus::Changed,
                },
            });

            SideBySideRow { position, old, new }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
