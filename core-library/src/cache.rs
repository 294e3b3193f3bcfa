//! Persistent cache of discovered folders and songs.
//!
//! The cache is what makes the crawl idempotent and resumable: folder child
//! lists are never re-fetched once cached, and settings payloads are fetched
//! at most once per song. [`CacheStore`] handles the durable JSON file;
//! [`LibraryCache`] owns the in-memory snapshot and enforces the
//! cache-then-save discipline — every mutation that adds information is
//! persisted before the caller issues its next network request.
//!
//! Single-threaded owner only; there is no locking and none is needed.

use crate::models::{folder_key, CacheSnapshot, Folder, Song};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Durable storage for the cache snapshot.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted snapshot.
    ///
    /// A missing or corrupt file is never fatal: corruption is logged and an
    /// empty snapshot is returned, so the run starts fresh.
    pub fn load(&self) -> CacheSnapshot {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return CacheSnapshot::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read cache, starting fresh");
                return CacheSnapshot::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => {
                info!(path = %self.path.display(), "Cache loaded");
                snapshot
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cache file is corrupt, starting fresh");
                CacheSnapshot::default()
            }
        }
    }

    /// Best-effort persist. Failure is logged and the run continues with the
    /// in-memory state.
    pub fn save(&self, snapshot: &CacheSnapshot) {
        if let Err(e) = self.try_save(snapshot) {
            error!(path = %self.path.display(), error = %e, "Failed to save cache");
        }
    }

    /// Write the snapshot through a temp file and rename it into place, so a
    /// crash mid-write cannot corrupt the previous snapshot.
    fn try_save(&self, snapshot: &CacheSnapshot) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// In-memory snapshot plus its durable store.
///
/// The single source of truth for "has this folder's children already been
/// enumerated" and "has this song's settings already been fetched". Callers
/// never re-derive that state independently.
pub struct LibraryCache {
    snapshot: CacheSnapshot,
    store: CacheStore,
}

impl LibraryCache {
    /// Open the cache at `path`, loading any persisted state.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = CacheStore::new(path);
        let snapshot = store.load();
        Self { snapshot, store }
    }

    /// Merge a page of freshly listed songs and persist.
    pub fn merge_songs(&mut self, songs: &[Song]) {
        if songs.is_empty() {
            return;
        }
        for song in songs {
            self.snapshot.merge_song(song.clone());
        }
        self.persist();
    }

    /// Cached child list for a parent folder, if one was ever enumerated.
    pub fn folder_children(&self, parent_id: Option<&str>) -> Option<Vec<Folder>> {
        self.snapshot.folders.get(&folder_key(parent_id)).cloned()
    }

    /// Record a folder's complete child list and persist. Once stored the
    /// list is authoritative for all future runs.
    pub fn set_folder_children(&mut self, parent_id: Option<&str>, children: Vec<Folder>) {
        self.snapshot.folders.insert(folder_key(parent_id), children);
        self.persist();
    }

    /// Cached settings payload for a song, if already fetched.
    pub fn song_settings(&self, song_id: &str) -> Option<Value> {
        self.snapshot
            .songs
            .get(song_id)
            .and_then(|song| song.settings.clone())
    }

    /// Record a song's settings payload and persist.
    pub fn set_song_settings(&mut self, song_id: &str, settings: Value) {
        self.snapshot
            .songs
            .entry(song_id.to_string())
            .or_insert_with(|| Song::with_id(song_id))
            .settings = Some(settings);
        self.persist();
    }

    /// Persist the current snapshot (best effort).
    pub fn persist(&self) {
        self.store.save(&self.snapshot);
    }

    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_cache_path() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tunevault-cache-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("data_cache.json")
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let store = CacheStore::new(temp_cache_path());
        assert_eq!(store.load(), CacheSnapshot::default());
    }

    #[test]
    fn test_load_corrupt_file_returns_default() {
        let path = temp_cache_path();
        std::fs::write(&path, "{not json").unwrap();

        let store = CacheStore::new(&path);
        assert_eq!(store.load(), CacheSnapshot::default());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let path = temp_cache_path();

        let mut cache = LibraryCache::open(&path);
        cache.set_folder_children(
            None,
            vec![Folder {
                id: Some("f-1".to_string()),
                name: "Drafts".to_string(),
                parent_id: None,
                extra: Default::default(),
            }],
        );
        cache.set_song_settings("s-1", json!({"seed": 7}));

        let reopened = LibraryCache::open(&path);
        assert_eq!(reopened.folder_children(None).unwrap().len(), 1);
        assert_eq!(reopened.song_settings("s-1"), Some(json!({"seed": 7})));
    }

    #[test]
    fn test_load_tolerates_unknown_fields() {
        let path = temp_cache_path();
        std::fs::write(
            &path,
            r#"{"songs": {}, "folders": {"root": []}, "exported_by": "v2"}"#,
        )
        .unwrap();

        let cache = LibraryCache::open(&path);
        assert!(cache.folder_children(None).is_some());

        // The unknown field survives the next save
        cache.persist();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("exported_by"));
    }

    #[test]
    fn test_merge_songs_persists() {
        let path = temp_cache_path();

        let mut cache = LibraryCache::open(&path);
        cache.merge_songs(&[Song::with_id("s-9")]);

        let reopened = LibraryCache::open(&path);
        assert!(reopened.snapshot().songs.contains_key("s-9"));
    }
}
