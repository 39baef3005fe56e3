//! Domain types and pure algorithms for manga version history.
//!
//! This crate has no I/O. It defines the content-addressed history records
//! published for every manga and chapter mutation, the parsing rules for
//! chapter image lists, the version diff engine, and pagination helpers
//! shared by the fetch, history, and API crates.

pub mod address;
pub mod anchor;
pub mod diff;
pub mod error;
pub mod image;
pub mod pagination;
pub mod record;
pub mod types;
