//! Content addresses.
//!
//! A [`ContentAddress`] identifies exactly one immutable payload in the
//! content-addressable store. The wire format uses the empty string to mean
//! "no address"; in Rust that is `Option::<ContentAddress>::None`, so a
//! constructed address is always non-empty.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Characters that would change the meaning of a gateway URL if an address
/// were appended to it verbatim.
const FORBIDDEN_CHARS: &[char] = &['/', '?', '#', '\\'];

/// An opaque, content-derived identifier (IPFS CID or equivalent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Validate and wrap a raw address.
    ///
    /// Surrounding whitespace is trimmed. Empty strings, embedded whitespace
    /// and URL delimiters are rejected.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidAddress("address is empty".to_string()));
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(&c))
        {
            return Err(CoreError::InvalidAddress(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse an address that may be absent.
    ///
    /// Returns `Ok(None)` for the empty string, which the wire format uses
    /// to mark the root of a history chain.
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, CoreError> {
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            Self::parse(raw).map(Some)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContentAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentAddress> for String {
    fn from(value: ContentAddress) -> Self {
        value.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serde adapter for `previousVersion`-style fields where `""` means none.
///
/// Reading is lenient: `null`, non-strings and malformed addresses all read
/// as `None`, so a damaged link ends a chain instead of hiding the record
/// that holds it. Use with `#[serde(with = "crate::address::optional")]`.
pub mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<ContentAddress>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(address) => serializer.serialize_str(address.as_str()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<ContentAddress>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .and_then(|raw| ContentAddress::parse_optional(raw).ok().flatten()))
    }
}
