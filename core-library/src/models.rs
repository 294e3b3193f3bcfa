//! Remote catalog object model and the persisted cache snapshot.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Cache key used for the conceptual root folder (which has no id).
pub const ROOT_FOLDER_KEY: &str = "root";

/// A single audio asset with its descriptive fields, as returned by the
/// remote catalog. Immutable once fetched; cached by identifier.
///
/// Only the fields the engine acts on are typed; everything else the remote
/// sends is preserved verbatim in `extra` and round-trips through the cache
/// file and the provenance payload untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Opaque, stable identifier
    pub id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub artist: Option<String>,

    /// Creation timestamp, ISO-8601; assumed UTC when no offset is given
    #[serde(default)]
    pub created_at: Option<String>,

    /// Audio asset URL
    #[serde(default)]
    pub song_path: Option<String>,

    /// Cover image URL
    #[serde(default)]
    pub image_path: Option<String>,

    /// Generation-settings payload, fetched lazily per song.
    /// Absent means not yet fetched or fetch failed; never a hard error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,

    /// Unknown remote fields, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Song {
    /// Minimal song record carrying only an identifier. Used when a settings
    /// payload arrives for a song the catalog never listed.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            artist: None,
            created_at: None,
            song_path: None,
            image_path: None,
            settings: None,
            extra: Map::new(),
        }
    }

    /// Parse `created_at` into a UTC timestamp.
    ///
    /// Accepts RFC 3339 (including a trailing `Z`) and naive ISO-8601
    /// datetimes, which are assumed to be UTC. Returns `None` if the field
    /// is absent or unparseable.
    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// A node in the remote service's folder hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Opaque identifier; `None` for the conceptual root
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,

    /// Unknown remote fields, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The persisted record of previously discovered songs and folders.
///
/// Invariant: a folder's child list, once cached, is treated as complete and
/// immutable for all future runs. That staleness trade-off is what makes the
/// crawl resumable without re-querying unchanged parts of the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub songs: HashMap<String, Song>,

    /// Child lists keyed by parent folder id, or [`ROOT_FOLDER_KEY`]
    #[serde(default)]
    pub folders: HashMap<String, Vec<Folder>>,

    /// Unknown top-level fields from older or newer cache schemas
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cache key for a parent folder id (`None` means root).
pub fn folder_key(parent_id: Option<&str>) -> String {
    match parent_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => ROOT_FOLDER_KEY.to_string(),
    }
}

impl CacheSnapshot {
    /// Merge a freshly listed song into the snapshot.
    ///
    /// The remote is authoritative for song fields, but a settings payload
    /// already cached from an earlier run survives the merge (the listing
    /// endpoint never returns settings).
    pub fn merge_song(&mut self, song: Song) {
        let prior_settings = self
            .songs
            .get(&song.id)
            .and_then(|existing| existing.settings.clone());

        let mut merged = song;
        if merged.settings.is_none() {
            merged.settings = prior_settings;
        }

        self.songs.insert(merged.id.clone(), merged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_song_deserializes_with_unknown_fields() {
        let song: Song = serde_json::from_value(json!({
            "id": "abc-123",
            "title": "Test Song",
            "artist": "Tester",
            "finished": true,
            "plays": 42
        }))
        .unwrap();

        assert_eq!(song.id, "abc-123");
        assert_eq!(song.title.as_deref(), Some("Test Song"));
        assert_eq!(song.extra.get("plays"), Some(&json!(42)));

        // Unknown fields survive a serialize round-trip
        let value = serde_json::to_value(&song).unwrap();
        assert_eq!(value.get("finished"), Some(&json!(true)));
    }

    #[test]
    fn test_creation_timestamp_rfc3339() {
        let mut song = Song::with_id("x");
        song.created_at = Some("2024-03-01T12:30:00.000Z".to_string());

        let ts = song.creation_timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_creation_timestamp_naive_assumed_utc() {
        let mut song = Song::with_id("x");
        song.created_at = Some("2024-03-01T12:30:00".to_string());

        let ts = song.creation_timestamp().unwrap();
        assert_eq!(ts.timestamp(), 1709296200);
    }

    #[test]
    fn test_creation_timestamp_invalid() {
        let mut song = Song::with_id("x");
        assert!(song.creation_timestamp().is_none());

        song.created_at = Some("last tuesday".to_string());
        assert!(song.creation_timestamp().is_none());
    }

    #[test]
    fn test_folder_key() {
        assert_eq!(folder_key(None), "root");
        assert_eq!(folder_key(Some("")), "root");
        assert_eq!(folder_key(Some("f-1")), "f-1");
    }

    #[test]
    fn test_merge_song_preserves_cached_settings() {
        let mut snapshot = CacheSnapshot::default();

        let mut cached = Song::with_id("s-1");
        cached.settings = Some(json!({"prompt": "lofi"}));
        snapshot.songs.insert("s-1".to_string(), cached);

        // A fresh listing for the same song carries no settings
        let mut listed = Song::with_id("s-1");
        listed.title = Some("Renamed".to_string());
        snapshot.merge_song(listed);

        let merged = &snapshot.songs["s-1"];
        assert_eq!(merged.title.as_deref(), Some("Renamed"));
        assert_eq!(merged.settings, Some(json!({"prompt": "lofi"})));
    }

    #[test]
    fn test_snapshot_tolerates_unknown_top_level_fields() {
        let snapshot: CacheSnapshot = serde_json::from_value(json!({
            "songs": {},
            "folders": {"root": []},
            "schema_version": 7
        }))
        .unwrap();

        assert!(snapshot.folders.contains_key("root"));
        assert_eq!(snapshot.extra.get("schema_version"), Some(&json!(7)));
    }
}
