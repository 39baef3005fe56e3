//! History records and their change entries.
//!
//! Every mutation of a manga or chapter publishes one immutable
//! [`HistoryRecord`] to the content-addressable store. Records form a
//! backward-linked chain through [`HistoryRecord::previous_version`].
//!
//! Producers are loosely typed. Only `version` and `type` are required;
//! every other field that does not match its expected shape degrades to a
//! default instead of making the whole record unreadable.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::address::ContentAddress;
use crate::types::{self, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of ancestor pointers a writer places in `recentVersions`.
pub const RECENT_VERSIONS_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// HistoryRecord
// ---------------------------------------------------------------------------

/// One immutable snapshot describing a single mutation of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Mutation counter, 0 at entity creation.
    pub version: u64,
    /// Kind of mutation this record describes.
    #[serde(rename = "type")]
    pub kind: HistoryType,
    #[serde(default)]
    pub change_log: ChangeLog,
    /// Newest-first ancestor pointers. A hint only; never used for traversal.
    /// Malformed entries are dropped.
    #[serde(default, deserialize_with = "deserialize_recent_versions")]
    pub recent_versions: Vec<VersionRef>,
    /// Address of the immediately preceding record, `None` at the root.
    ///
    /// A malformed address also reads as `None`, which ends the chain here.
    #[serde(default, with = "crate::address::optional")]
    pub previous_version: Option<ContentAddress>,
}

impl HistoryRecord {
    /// Whether this record is the first one in its chain.
    pub fn is_root(&self) -> bool {
        self.previous_version.is_none()
    }

    /// Number of change entries kept only as raw JSON.
    pub fn unparsed_changes(&self) -> usize {
        self.change_log
            .changes
            .iter()
            .filter(|entry| entry.kind() == ChangeKind::Unparsed)
            .count()
    }
}

fn deserialize_recent_versions<'de, D>(deserializer: D) -> Result<Vec<VersionRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}

/// Pointer to an ancestor record inside `recentVersions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRef {
    pub version: u64,
    pub cid: ContentAddress,
}

/// The kind of mutation recorded.
///
/// Values written by a newer backend that this build does not know parse as
/// [`HistoryType::Unknown`] rather than making the record unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryType {
    CreateManga,
    UpdateManga,
    PublishManga,
    UnpublishManga,
    DeleteManga,
    AddCategory,
    RemoveCategory,
    CreateChapter,
    UpdateChapter,
    DeleteChapter,
    DeleteImage,
    #[serde(other)]
    Unknown,
}

impl HistoryType {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateManga => "CREATE_MANGA",
            Self::UpdateManga => "UPDATE_MANGA",
            Self::PublishManga => "PUBLISH_MANGA",
            Self::UnpublishManga => "UNPUBLISH_MANGA",
            Self::DeleteManga => "DELETE_MANGA",
            Self::AddCategory => "ADD_CATEGORY",
            Self::RemoveCategory => "REMOVE_CATEGORY",
            Self::CreateChapter => "CREATE_CHAPTER",
            Self::UpdateChapter => "UPDATE_CHAPTER",
            Self::DeleteChapter => "DELETE_CHAPTER",
            Self::DeleteImage => "DELETE_IMAGE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the mutation targets a chapter rather than the manga itself.
    pub fn is_chapter_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateChapter | Self::UpdateChapter | Self::DeleteChapter | Self::DeleteImage
        )
    }
}

impl std::fmt::Display for HistoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing description of a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    /// `None` when absent or not a recognisable ISO-8601 string.
    #[serde(default, with = "types::lenient_timestamp")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_changes")]
    pub changes: Vec<ChangeEntry>,
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn deserialize_changes<'de, D>(deserializer: D) -> Result<Vec<ChangeEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries.into_iter().map(ChangeEntry::from_value).collect())
}

// ---------------------------------------------------------------------------
// Loosely typed scalars
// ---------------------------------------------------------------------------

/// An identifier or number that writers emit either as a JSON number or a
/// JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeEntry
// ---------------------------------------------------------------------------

/// A single change inside a [`ChangeLog`].
///
/// The wire format has no discriminant; the variant is chosen once at parse
/// time by field presence: `field`, then `manga_title`, then `chap_id`.
/// Anything else (including non-objects) is [`ChangeEntry::Empty`]. An
/// object that has the marker key but not the shape of its variant is kept
/// verbatim as [`ChangeEntry::Unparsed`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEntry {
    Field(FieldChange),
    MangaCreated(MangaSnapshot),
    ChapterCreated(ChapterSnapshot),
    Unparsed(Map<String, Value>),
    Empty,
}

/// Discriminant of a [`ChangeEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Field,
    MangaCreated,
    ChapterCreated,
    Unparsed,
    Empty,
}

/// A simple `{field, oldValue, newValue}` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    #[serde(default)]
    pub old_value: Value,
    #[serde(default)]
    pub new_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Full manga payload captured at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manga_id: Option<Scalar>,
    pub manga_title: String,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    /// Remaining snapshot fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Scalar>,
    #[serde(default)]
    pub category_name: String,
}

/// Full chapter payload captured at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSnapshot {
    /// `None` when the producer wrote `null`.
    #[serde(default)]
    pub chap_id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chap_number: Option<Scalar>,
    /// Address of the chapter's image list, as written by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chap_content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeEntry {
    /// Classify a raw JSON value into a change entry. Never fails.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Empty;
        };

        if map.contains_key("field") {
            Self::decode(map, Self::Field)
        } else if map.contains_key("manga_title") {
            Self::decode(map, Self::MangaCreated)
        } else if map.contains_key("chap_id") {
            Self::decode(map, Self::ChapterCreated)
        } else {
            Self::Empty
        }
    }

    fn decode<T>(map: Map<String, Value>, wrap: fn(T) -> Self) -> Self
    where
        T: serde::de::DeserializeOwned,
    {
        match serde_json::from_value::<T>(Value::Object(map.clone())) {
            Ok(typed) => wrap(typed),
            Err(_) => Self::Unparsed(map),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Field(_) => ChangeKind::Field,
            Self::MangaCreated(_) => ChangeKind::MangaCreated,
            Self::ChapterCreated(_) => ChangeKind::ChapterCreated,
            Self::Unparsed(_) => ChangeKind::Unparsed,
            Self::Empty => ChangeKind::Empty,
        }
    }
}

impl<'de> Deserialize<'de> for ChangeEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Serialize for ChangeEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Field(change) => change.serialize(serializer),
            Self::MangaCreated(snapshot) => snapshot.serialize(serializer),
            Self::ChapterCreated(snapshot) => snapshot.serialize(serializer),
            Self::Unparsed(raw) => raw.serialize(serializer),
            Self::Empty => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn record_json() -> Value {
        json!({
            "version": 2,
            "type": "UPDATE_MANGA",
            "changeLog": {
                "timestamp": "2024-05-01T10:00:00.000Z",
                "description": "Updated title",
                "changes": [
                    { "field": "title", "oldValue": "Old", "newValue": "New" }
                ]
            },
            "recentVersions": [
                { "version": 1, "cid": "QmOne" },
                { "version": 0, "cid": "QmZero" }
            ],
            "previousVersion": "QmOne"
        })
    }

    #[test]
    fn parses_full_record() {
        let record: HistoryRecord = serde_json::from_value(record_json()).unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.kind, HistoryType::UpdateManga);
        assert_eq!(record.change_log.description, "Updated title");
        assert_eq!(record.recent_versions.len(), 2);
        assert_eq!(record.previous_version.as_ref().unwrap().as_str(), "QmOne");
        assert!(!record.is_root());
    }

    #[test]
    fn empty_previous_version_is_root() {
        let mut raw = record_json();
        raw["previousVersion"] = json!("");
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert!(record.is_root());

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["previousVersion"], "");
    }

    #[test]
    fn missing_optional_fields_default() {
        let record: HistoryRecord = serde_json::from_value(json!({
            "version": 0,
            "type": "CREATE_MANGA",
            "changeLog": { "timestamp": "2024-01-01T00:00:00Z" }
        }))
        .unwrap();
        assert!(record.is_root());
        assert!(record.recent_versions.is_empty());
        assert!(record.change_log.changes.is_empty());
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let mut raw = record_json();
        raw["type"] = json!("ARCHIVE_MANGA");
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.kind, HistoryType::Unknown);
    }

    #[test]
    fn field_takes_priority_over_snapshots() {
        let entry = ChangeEntry::from_value(json!({
            "field": "category",
            "oldValue": null,
            "newValue": "Action",
            "categoryId": 7,
            "categoryName": "Action",
            "manga_title": "ignored"
        }));
        assert_matches!(entry, ChangeEntry::Field(ref change) if change.field == "category");
        if let ChangeEntry::Field(change) = entry {
            assert_eq!(change.category_id, Some(Scalar::Int(7)));
        }
    }

    #[test]
    fn manga_snapshot_is_detected() {
        let entry = ChangeEntry::from_value(json!({
            "manga_id": 12,
            "manga_title": "Blue Sky",
            "manga_author": "K. Ito",
            "categories": [{ "categoryId": "3", "categoryName": "Drama" }]
        }));
        assert_eq!(entry.kind(), ChangeKind::MangaCreated);
        let ChangeEntry::MangaCreated(snapshot) = entry else {
            panic!("expected manga snapshot");
        };
        assert_eq!(snapshot.manga_title, "Blue Sky");
        assert_eq!(snapshot.categories[0].category_id, Some(Scalar::Text("3".into())));
        assert_eq!(snapshot.extra["manga_author"], "K. Ito");
    }

    #[test]
    fn chapter_snapshot_is_detected() {
        let entry = ChangeEntry::from_value(json!({
            "chap_id": 44,
            "chap_number": 1.5,
            "chap_content": "QmPages"
        }));
        let ChangeEntry::ChapterCreated(snapshot) = entry else {
            panic!("expected chapter snapshot");
        };
        assert_eq!(snapshot.chap_id, Some(Scalar::Int(44)));
        assert_eq!(snapshot.chap_number, Some(Scalar::Float(1.5)));
        assert_eq!(snapshot.chap_content.as_deref(), Some("QmPages"));
    }

    #[test]
    fn unrecognised_shapes_are_empty() {
        assert_eq!(ChangeEntry::from_value(json!({})), ChangeEntry::Empty);
        assert_eq!(ChangeEntry::from_value(json!({"x": 1})), ChangeEntry::Empty);
        assert_eq!(ChangeEntry::from_value(json!("text")), ChangeEntry::Empty);
        assert_eq!(serde_json::to_value(ChangeEntry::Empty).unwrap(), json!({}));
    }

    #[test]
    fn field_change_serializes_camel_case() {
        let entry = ChangeEntry::from_value(json!({
            "field": "status",
            "oldValue": "draft",
            "newValue": "published"
        }));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["oldValue"], "draft");
        assert_eq!(value["newValue"], "published");
        assert!(value.get("categoryId").is_none());
    }

    #[test]
    fn history_type_display() {
        assert_eq!(HistoryType::DeleteImage.to_string(), "DELETE_IMAGE");
        assert!(HistoryType::DeleteImage.is_chapter_mutation());
        assert!(!HistoryType::PublishManga.is_chapter_mutation());
    }

    #[test]
    fn null_chapter_id_is_accepted() {
        let entry = ChangeEntry::from_value(json!({ "chap_id": null, "chap_number": 2 }));
        let ChangeEntry::ChapterCreated(snapshot) = entry else {
            panic!("expected chapter snapshot");
        };
        assert_eq!(snapshot.chap_id, None);
        assert_eq!(snapshot.chap_number, Some(Scalar::Int(2)));
    }

    #[test]
    fn category_without_id_is_accepted() {
        let entry = ChangeEntry::from_value(json!({
            "manga_title": "Blue Sky",
            "categories": [{ "categoryName": "Drama" }]
        }));
        let ChangeEntry::MangaCreated(snapshot) = entry else {
            panic!("expected manga snapshot");
        };
        assert_eq!(snapshot.categories[0].category_id, None);
        assert_eq!(snapshot.categories[0].category_name, "Drama");
    }

    #[test]
    fn misshapen_entry_is_kept_raw() {
        let raw = json!({ "manga_title": "Blue Sky", "categories": [{ "categoryId": { "id": 3 } }] });
        let entry = ChangeEntry::from_value(raw.clone());
        assert_eq!(entry.kind(), ChangeKind::Unparsed);
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn record_survives_misshapen_changes() {
        let mut raw = record_json();
        raw["changeLog"]["changes"] = json!([
            { "chap_id": { "nested": true } },
            { "field": 12 },
            { "field": "title", "oldValue": "a", "newValue": "b" }
        ]);
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.change_log.changes.len(), 3);
        assert_eq!(record.unparsed_changes(), 2);
        assert_eq!(record.change_log.changes[2].kind(), ChangeKind::Field);
    }

    #[test]
    fn offsetless_timestamp_is_read_as_utc() {
        let mut raw = record_json();
        raw["changeLog"]["timestamp"] = json!("2024-06-01T08:30:00");
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(
            record.change_log.timestamp.unwrap().to_rfc3339(),
            "2024-06-01T08:30:00+00:00"
        );
    }

    #[test]
    fn unreadable_change_log_fields_default() {
        let mut raw = record_json();
        raw["changeLog"] = json!({ "timestamp": "someday", "description": null, "changes": "none" });
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.change_log.timestamp, None);
        assert_eq!(record.change_log.description, "");
        assert!(record.change_log.changes.is_empty());
    }

    #[test]
    fn malformed_recent_versions_are_dropped() {
        let mut raw = record_json();
        raw["recentVersions"] = json!([
            { "version": 1, "cid": "QmOne" },
            { "version": 0, "cid": "" },
            "QmLoose"
        ]);
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.recent_versions.len(), 1);
        assert_eq!(record.recent_versions[0].cid.as_str(), "QmOne");
    }

    #[test]
    fn malformed_previous_version_makes_record_a_root() {
        let mut raw = record_json();
        raw["previousVersion"] = json!("QmOne/extra?x=1");
        let record: HistoryRecord = serde_json::from_value(raw).unwrap();
        assert!(record.is_root());
        assert_eq!(record.version, 2);
    }
}
