//! Chapter image lists.
//!
//! A chapter's content payload is a JSON array of raw image entries. The
//! store gives no ordering guarantee, entries may reference images by bare
//! content address or by URL, and some entries are malformed. [`parse_image_list`]
//! turns such a payload into a clean list sorted by page number.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One page image of a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute URL of the image.
    pub url: String,
    pub page: u32,
}

impl ImageRecord {
    pub fn new(url: impl Into<String>, page: u32) -> Self {
        Self {
            url: url.into(),
            page,
        }
    }
}

/// Renumbered page used by the reader and the chapter editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderPage {
    pub id: u32,
    pub url: String,
    pub page_number: u32,
}

/// Why a raw entry was left out of a parsed image list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippedEntry {
    /// Entry at this position is not a JSON object.
    NotAnObject(usize),
    /// Entry at this position has no usable `image` or `url` field.
    MissingUrl(usize),
}

/// Result of parsing a raw image-list payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImages {
    /// Valid entries, sorted ascending by page.
    pub images: Vec<ImageRecord>,
    pub skipped: Vec<SkippedEntry>,
}

// ---------------------------------------------------------------------------
// URL normalization
// ---------------------------------------------------------------------------

/// Whether `url` starts with an RFC 3986 scheme (`http:`, `ipfs:`, `data:` ...).
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Turn a raw image reference into an absolute URL.
///
/// - A value with a scheme is returned verbatim.
/// - A protocol-relative value (`//host/...`) gets `https:` prepended.
/// - Anything else is a bare content address and is appended to the
///   gateway base URL with exactly one `/` between them.
pub fn normalize_image_url(raw: &str, gateway_base_url: &str) -> String {
    let raw = raw.trim();
    if has_scheme(raw) {
        raw.to_string()
    } else if raw.starts_with("//") {
        format!("https:{raw}")
    } else {
        format!(
            "{}/{}",
            gateway_base_url.trim_end_matches('/'),
            raw.trim_start_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Read a page number from a JSON number or numeric string.
fn page_value(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a non-empty string field.
fn url_value(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a raw image-list payload.
///
/// Accepts a JSON array, or an object carrying the array under `images`.
/// Any other payload yields `None`. Per entry, the URL comes from `image`
/// (preferred) or `url`; the page from `page` or `pageNumber`, falling back
/// to the entry's 1-based position. Entries without a usable URL are
/// reported in [`ParsedImages::skipped`] instead of failing the whole list.
pub fn parse_image_list(payload: &Value, gateway_base_url: &str) -> Option<ParsedImages> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(map) => map.get("images")?.as_array()?,
        _ => return None,
    };

    let mut parsed = ParsedImages::default();

    for (index, entry) in entries.iter().enumerate() {
        let Some(fields) = entry.as_object() else {
            parsed.skipped.push(SkippedEntry::NotAnObject(index));
            continue;
        };

        let Some(raw_url) = url_value(fields.get("image")).or_else(|| url_value(fields.get("url")))
        else {
            parsed.skipped.push(SkippedEntry::MissingUrl(index));
            continue;
        };

        let page = page_value(fields.get("page"))
            .or_else(|| page_value(fields.get("pageNumber")))
            .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));

        parsed
            .images
            .push(ImageRecord::new(normalize_image_url(raw_url, gateway_base_url), page));
    }

    sort_by_page(&mut parsed.images);
    Some(parsed)
}

/// Sort images ascending by page number, keeping the relative order of
/// entries that share a page.
pub fn sort_by_page(images: &mut [ImageRecord]) {
    images.sort_by_key(|image| image.page);
}

/// Renumber a page-sorted list to contiguous 1-based reader pages.
pub fn renumber_pages(images: &[ImageRecord]) -> Vec<ReaderPage> {
    images
        .iter()
        .zip(1u32..)
        .map(|(image, number)| ReaderPage {
            id: number,
            url: image.url.clone(),
            page_number: number,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
