//! Page/limit pagination over in-memory lists.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Maximum number of items per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Clamp a requested page size to `[1, max]`, using `default` when absent
/// or zero.
pub fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    match limit {
        Some(0) | None => default,
        Some(n) => n.min(max),
    }
    .max(1)
}

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: usize,
    /// 1-based page number actually served.
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Transform the items of a page, keeping its position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// Slice `items` into the requested page.
///
/// The limit goes through [`clamp_limit`]; the page is clamped to
/// `[1, total_pages]` (page 1 when there are no items).
pub fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>) -> Page<T> {
    let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let total = items.len();
    let total_pages = u32::try_from(total.div_ceil(limit as usize)).unwrap_or(u32::MAX);
    let page = page.unwrap_or(1).clamp(1, total_pages.max(1));

    let offset = (page as usize - 1) * limit as usize;
    let data = items
        .into_iter()
        .skip(offset)
        .take(limit as usize)
        .collect();

    Page {
        total,
        page,
        limit,
        total_pages,
        data,
    }
}
