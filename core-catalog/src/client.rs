//! Catalog client implementation.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::{Folder, LibraryCache, Song};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::CatalogError;
use crate::types::{FolderListRequest, FolderListResponse, SongListResponse};

/// User agent presented on every catalog request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Timeout for catalog API exchanges (downloads have their own).
const API_TIMEOUT: Duration = Duration::from_secs(20);

/// Catalog endpoints and credentials.
///
/// Templates use `{page_size}`, `{offset}`, `{folder}` and `{song_id}`
/// placeholders. The two credentials authorize different endpoint families:
/// `folder_token` (sent verbatim in the `Authorization` header) for folder
/// queries, `song_cookies` for song and settings queries.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub song_list_template: String,
    pub folder_list_url: String,
    pub song_settings_template: String,
    pub folder_token: String,
    pub song_cookies: String,
    pub page_size: u32,
    pub request_delay: Duration,
}

/// Client for the remote catalog.
///
/// Every operation consults and updates the [`LibraryCache`] passed in by
/// the orchestrator; the client itself is stateless between calls.
pub struct CatalogClient {
    http: Arc<dyn HttpClient>,
    config: CatalogConfig,
    song_headers: HashMap<String, String>,
    folder_headers: HashMap<String, String>,
}

impl CatalogClient {
    pub fn new(http: Arc<dyn HttpClient>, config: CatalogConfig) -> Self {
        let mut song_headers = HashMap::new();
        song_headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
        song_headers.insert(
            "Accept".to_string(),
            "application/json, text/plain, */*".to_string(),
        );
        song_headers.insert("Cookie".to_string(), config.song_cookies.clone());

        let mut folder_headers = HashMap::new();
        folder_headers.insert("User-Agent".to_string(), USER_AGENT.to_string());
        folder_headers.insert("Accept".to_string(), "*/*".to_string());
        folder_headers.insert("Authorization".to_string(), config.folder_token.clone());
        folder_headers.insert("connect-protocol-version".to_string(), "1".to_string());

        Self {
            http,
            config,
            song_headers,
            folder_headers,
        }
    }

    /// Headers for song and settings requests; also used for asset
    /// downloads, which are authorized the same way.
    pub fn song_headers(&self) -> &HashMap<String, String> {
        &self.song_headers
    }

    /// List every song in a folder (`None` means root), paginating with the
    /// configured page size.
    ///
    /// Each page is merged into the cache as it arrives (the remote is
    /// authoritative for song fields). Pagination stops on an empty page or
    /// a page shorter than requested. A 401 aborts the listing and returns
    /// an empty result; any other failure ends pagination early with
    /// whatever was gathered so far.
    pub async fn list_songs(&self, folder_id: Option<&str>, cache: &mut LibraryCache) -> Vec<Song> {
        let folder_label = folder_id.unwrap_or("root");
        debug!(folder = folder_label, "Listing songs");

        let mut all_songs = Vec::new();
        let mut offset: u32 = 0;

        loop {
            self.pace().await;

            let url = self.song_page_url(folder_id, offset);
            let request = HttpRequest::new(HttpMethod::Get, url)
                .headers(&self.song_headers)
                .timeout(API_TIMEOUT);

            let page: SongListResponse = match self.fetch_json(request).await {
                Ok(page) => page,
                Err(CatalogError::Unauthorized) => {
                    error!(
                        "HTTP 401 on song listing: the session cookies are stale. \
                         Update auth.song_cookies in the config file and rerun."
                    );
                    return Vec::new();
                }
                Err(e) => {
                    error!(folder = folder_label, offset, error = %e, "Song listing failed");
                    break;
                }
            };

            let fetched = page.data.len() as u32;
            cache.merge_songs(&page.data);
            all_songs.extend(page.data);

            if fetched == 0 || fetched < self.config.page_size {
                break;
            }
            offset += self.config.page_size;
        }

        info!(folder = folder_label, count = all_songs.len(), "Songs found");
        all_songs
    }

    /// List the direct subfolders of a parent (`None` means root).
    ///
    /// Cache-first: a previously enumerated child list is returned without
    /// any network call and is authoritative for the remainder of all runs.
    /// On a miss, a successful response is cached and persisted; failures
    /// return an empty list and cache nothing, so the folder is treated as
    /// a leaf this run and retried fresh on the next one.
    pub async fn list_folders(
        &self,
        parent_id: Option<&str>,
        cache: &mut LibraryCache,
    ) -> Vec<Folder> {
        let parent_label = parent_id.unwrap_or("root");

        if let Some(children) = cache.folder_children(parent_id) {
            debug!(parent = parent_label, count = children.len(), "Subfolders from cache");
            return children;
        }

        self.pace().await;

        let payload = FolderListRequest::depth_one(parent_id);
        let request = match HttpRequest::new(HttpMethod::Post, &self.config.folder_list_url)
            .headers(&self.folder_headers)
            .timeout(API_TIMEOUT)
            .json(&payload)
        {
            Ok(request) => request,
            Err(e) => {
                error!(parent = parent_label, error = %e, "Failed to build folder request");
                return Vec::new();
            }
        };

        match self.fetch_json::<FolderListResponse>(request).await {
            Ok(response) => {
                info!(parent = parent_label, count = response.folders.len(), "Subfolders found");
                cache.set_folder_children(parent_id, response.folders.clone());
                response.folders
            }
            Err(CatalogError::Unauthorized) => {
                error!(
                    "HTTP 401 on folder listing: the bearer token is stale. \
                     Update auth.folder_token in the config file and rerun."
                );
                Vec::new()
            }
            Err(e) => {
                error!(parent = parent_label, error = %e, "Folder listing failed");
                Vec::new()
            }
        }
    }

    /// Fetch a song's generation-settings payload, cache-first.
    ///
    /// On a miss the payload is fetched once, merged into the cached song
    /// and persisted. Any failure is a warning and yields `None`; the
    /// caller proceeds without settings rather than failing the song.
    pub async fn song_settings(&self, song_id: &str, cache: &mut LibraryCache) -> Option<Value> {
        if let Some(settings) = cache.song_settings(song_id) {
            return Some(settings);
        }

        self.pace().await;

        let url = self
            .config
            .song_settings_template
            .replace("{song_id}", song_id);
        let request = HttpRequest::new(HttpMethod::Get, url)
            .headers(&self.song_headers)
            .timeout(API_TIMEOUT);

        match self.fetch_json::<Value>(request).await {
            Ok(settings) => {
                cache.set_song_settings(song_id, settings.clone());
                Some(settings)
            }
            Err(e) => {
                warn!(song_id, error = %e, "Failed to fetch song settings");
                None
            }
        }
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, CatalogError> {
        let response = self.http.execute(request).await?;

        if response.is_unauthorized() {
            return Err(CatalogError::Unauthorized);
        }
        if !response.is_success() {
            return Err(CatalogError::Api(response.status));
        }

        response
            .json()
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    fn song_page_url(&self, folder_id: Option<&str>, offset: u32) -> String {
        self.config
            .song_list_template
            .replace("{page_size}", &self.config.page_size.to_string())
            .replace("{offset}", &offset.to_string())
            .replace(
                "{folder}",
                &urlencoding::encode(folder_id.unwrap_or("")),
            )
    }

    async fn pace(&self) {
        if !self.config.request_delay.is_zero() {
            sleep(self.config.request_delay).await;
        }
    }
}
