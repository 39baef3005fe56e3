//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page-based pagination parameters (`?page=&limit=`).
///
/// Values are clamped by `mangaledger_core::pagination::paginate`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Addresses of the two versions to compare (`?old=&new=`).
///
/// Either side may be omitted or empty, which compares against an empty
/// image list.
#[derive(Debug, Default, Deserialize)]
pub struct CompareParams {
    #[serde(default)]
    pub old: String,
    #[serde(default)]
    pub new: String,
}
