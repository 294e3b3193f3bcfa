//! Downloads a single song into its mirrored folder.

use bridge_traits::http::HttpClient;
use chrono::{DateTime, Utc};
use core_catalog::CatalogClient;
use core_library::{LibraryCache, Song, TagWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

use crate::fetcher::HttpCoverFetcher;

/// Characters stripped from titles and folder names before they become
/// path components.
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Remove filesystem-hostile characters from a path component.
pub fn sanitize_component(name: &str) -> String {
    name.chars().filter(|c| !FORBIDDEN.contains(c)).collect()
}

/// Deterministic on-disk filename for a song.
///
/// The last hyphen-separated segment of the song id disambiguates songs
/// that share a title; the same song always maps to the same name, which
/// is what makes the exists-check a reliable skip signal. The `_ID`
/// marker keeps filenames byte-identical to earlier exports of the same
/// library.
pub fn target_filename(song: &Song) -> String {
    let title = song.title.as_deref().unwrap_or("Untitled");
    let suffix = song.id.rsplit('-').next().unwrap_or(&song.id);
    format!("{} [{}_ID].mp3", sanitize_component(title), suffix)
}

/// Turns one catalog song record into a tagged file on disk.
pub struct Materializer {
    http: Arc<dyn HttpClient>,
    tagger: Arc<dyn TagWriter>,
}

impl Materializer {
    pub fn new(http: Arc<dyn HttpClient>, tagger: Arc<dyn TagWriter>) -> Self {
        Self { http, tagger }
    }

    /// Materialize `song` under `dest_dir`. Returns `true` only when a new
    /// file was downloaded this call; an existing file or any failure
    /// returns `false` without touching the download budget.
    ///
    /// A failed download removes the partial file so the next run retries
    /// it. Settings, tagging and timestamp failures degrade the file but
    /// never undo the download.
    pub async fn materialize(
        &self,
        song: &Song,
        dest_dir: &Path,
        catalog: &CatalogClient,
        cache: &mut LibraryCache,
    ) -> bool {
        let target = dest_dir.join(target_filename(song));

        if target.exists() {
            debug!(file = %target.display(), "Already exported, skipping");
            return false;
        }

        let Some(audio_url) = song.song_path.as_deref() else {
            warn!(song_id = %song.id, "Song has no audio URL, skipping");
            return false;
        };

        info!(song_id = %song.id, file = %target.display(), "Downloading");

        if let Err(e) = self
            .http
            .download_to_file(audio_url, catalog.song_headers(), &target)
            .await
        {
            error!(song_id = %song.id, error = %e, "Download failed");
            let _ = std::fs::remove_file(&target);
            return false;
        }

        let settings = catalog.song_settings(&song.id, cache).await;

        let covers = HttpCoverFetcher::new(Arc::clone(&self.http));
        self.tagger
            .write_tags(&target, song, settings.as_ref(), &covers)
            .await;

        if let Some(created) = song.creation_timestamp() {
            if let Err(e) = set_file_times(&target, created) {
                warn!(file = %target.display(), error = %e, "Failed to set file times");
            }
        }

        true
    }
}

/// Stamp the file's modified and accessed times with the song's catalog
/// creation time, so local sort-by-date mirrors the remote library.
fn set_file_times(path: &Path, timestamp: DateTime<Utc>) -> std::io::Result<()> {
    let when: SystemTime = timestamp.into();
    let times = std::fs::FileTimes::new().set_accessed(when).set_modified(when);
    std::fs::OpenOptions::new()
        .write(true)
        .open(path)?
        .set_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bytes::Bytes;
    use core_catalog::CatalogConfig;
    use core_library::CoverFetcher;
    use mockall::mock;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;
    use uuid::Uuid;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::Result<HttpResponse>;
            async fn download_to_file(
                &self,
                url: &str,
                headers: &HashMap<String, String>,
                dest: &Path,
            ) -> bridge_traits::Result<()>;
        }
    }

    struct NoopTagWriter;

    #[async_trait]
    impl TagWriter for NoopTagWriter {
        async fn write_tags(
            &self,
            _path: &Path,
            _song: &Song,
            _settings: Option<&Value>,
            _covers: &dyn CoverFetcher,
        ) {
        }
    }

    fn test_config() -> CatalogConfig {
        CatalogConfig {
            song_list_template:
                "https://api.test/songs?pageSize={page_size}&pageParam={offset}&inFolder={folder}"
                    .to_string(),
            folder_list_url: "https://api.test/folders".to_string(),
            song_settings_template: "https://api.test/songs/{song_id}/settings".to_string(),
            folder_token: "Bearer test".to_string(),
            song_cookies: "sid=test".to_string(),
            page_size: 100,
            request_delay: Duration::ZERO,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tunevault-export-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn test_song(id: &str, title: &str) -> Song {
        let mut song = Song::with_id(id);
        song.title = Some(title.to_string());
        song.song_path = Some(format!("https://cdn.test/audio/{id}.mp3"));
        song
    }

    fn json_response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(serde_json::to_vec(&body).unwrap()),
        }
    }

    #[test]
    fn test_sanitize_strips_forbidden_characters() {
        assert_eq!(sanitize_component(r#"a\b/c*d?e:f"g<h>i|j"#), "abcdefghij");
        assert_eq!(sanitize_component("Plain Title"), "Plain Title");
    }

    #[test]
    fn test_target_filename_is_deterministic() {
        let song = test_song("1a2b-3c4d-5e6f", "My: Song?");
        assert_eq!(target_filename(&song), "My Song [5e6f_ID].mp3");
        assert_eq!(target_filename(&song), target_filename(&song));
    }

    #[test]
    fn test_target_filename_without_title() {
        let song = Song::with_id("nohyphens");
        assert_eq!(target_filename(&song), "Untitled [nohyphens_ID].mp3");
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_network() {
        let dir = temp_dir();
        let song = test_song("s-1", "Done");
        std::fs::write(dir.join(target_filename(&song)), b"already here").unwrap();

        // No expectations: any HTTP call would panic the mock.
        let http = Arc::new(MockHttpClient::new());
        let materializer = Materializer::new(http.clone(), Arc::new(NoopTagWriter));
        let catalog = CatalogClient::new(http, test_config());
        let mut cache = LibraryCache::open(dir.join("cache.json"));

        let downloaded = materializer
            .materialize(&song, &dir, &catalog, &mut cache)
            .await;
        assert!(!downloaded);
    }

    #[tokio::test]
    async fn test_missing_audio_url_is_skipped() {
        let dir = temp_dir();
        let mut song = test_song("s-1", "Ghost");
        song.song_path = None;

        let http = Arc::new(MockHttpClient::new());
        let materializer = Materializer::new(http.clone(), Arc::new(NoopTagWriter));
        let catalog = CatalogClient::new(http, test_config());
        let mut cache = LibraryCache::open(dir.join("cache.json"));

        let downloaded = materializer
            .materialize(&song, &dir, &catalog, &mut cache)
            .await;
        assert!(!downloaded);
    }

    #[tokio::test]
    async fn test_failed_download_removes_partial_file() {
        let dir = temp_dir();
        let song = test_song("s-1", "Flaky");
        let target = dir.join(target_filename(&song));

        let mut http = MockHttpClient::new();
        http.expect_download_to_file().times(1).returning(|_, _, dest| {
            std::fs::write(dest, b"half a file").unwrap();
            Err(bridge_traits::BridgeError::Timeout(
                "deadline exceeded".to_string(),
            ))
        });

        let http = Arc::new(http);
        let materializer = Materializer::new(http.clone(), Arc::new(NoopTagWriter));
        let catalog = CatalogClient::new(http, test_config());
        let mut cache = LibraryCache::open(dir.join("cache.json"));

        let downloaded = materializer
            .materialize(&song, &dir, &catalog, &mut cache)
            .await;

        assert!(!downloaded);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_successful_download_fetches_settings_and_caches() {
        let dir = temp_dir();
        let song = test_song("s-1", "Fresh");
        let target = dir.join(target_filename(&song));

        let mut http = MockHttpClient::new();
        http.expect_download_to_file().times(1).returning(|_, _, dest| {
            std::fs::write(dest, b"audio bytes").unwrap();
            Ok(())
        });
        http.expect_execute()
            .withf(|req| req.url.ends_with("/songs/s-1/settings"))
            .times(1)
            .returning(|_| Ok(json_response(200, json!({"prompt": "lofi"}))));

        let http = Arc::new(http);
        let materializer = Materializer::new(http.clone(), Arc::new(NoopTagWriter));
        let catalog = CatalogClient::new(http, test_config());
        let mut cache = LibraryCache::open(dir.join("cache.json"));

        let downloaded = materializer
            .materialize(&song, &dir, &catalog, &mut cache)
            .await;

        assert!(downloaded);
        assert!(target.exists());
        assert_eq!(cache.song_settings("s-1"), Some(json!({"prompt": "lofi"})));
    }

    #[tokio::test]
    async fn test_settings_failure_does_not_undo_download() {
        let dir = temp_dir();
        let song = test_song("s-1", "Stubborn");
        let target = dir.join(target_filename(&song));

        let mut http = MockHttpClient::new();
        http.expect_download_to_file().times(1).returning(|_, _, dest| {
            std::fs::write(dest, b"audio bytes").unwrap();
            Ok(())
        });
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(json_response(503, json!({}))));

        let http = Arc::new(http);
        let materializer = Materializer::new(http.clone(), Arc::new(NoopTagWriter));
        let catalog = CatalogClient::new(http, test_config());
        let mut cache = LibraryCache::open(dir.join("cache.json"));

        let downloaded = materializer
            .materialize(&song, &dir, &catalog, &mut cache)
            .await;

        assert!(downloaded);
        assert!(target.exists());
    }

    #[test]
    fn test_set_file_times_applies_timestamp() {
        let dir = temp_dir();
        let path = dir.join("timed.mp3");
        std::fs::write(&path, b"x").unwrap();

        let when = "2023-03-15T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        set_file_times(&path, when).unwrap();

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, SystemTime::from(when));
    }
}
