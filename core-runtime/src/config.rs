//! # Exporter Configuration
//!
//! Loads the exporter configuration from a TOML file and validates it
//! fail-fast before any network activity.
//!
//! ## Overview
//!
//! The configuration covers three concerns:
//! - `[auth]` — the two credentials the remote service requires: a bearer
//!   token for folder queries and a session-cookie string for song queries.
//!   Both ship as placeholders; the pre-flight check refuses to start until
//!   they are filled in.
//! - `[export]` — output directory, cache file, inter-request delay, page
//!   size, and the optional depth/download budgets.
//! - `[api]` — endpoint templates for the remote catalog. These default to
//!   the known service endpoints and rarely need changing.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::ExporterConfig;
//!
//! let config = ExporterConfig::load("tunevault.toml")?;
//! config.validate()?;
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Placeholder values shipped in the sample config. Starting a run with
/// either still in place is a configuration error.
const TOKEN_PLACEHOLDER: &str = "token";
const COOKIES_PLACEHOLDER: &str = "cookies";

/// Top-level exporter configuration, read once at startup and immutable
/// for the duration of a run.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExporterConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Authentication credentials.
///
/// The remote service uses two distinct credential forms: folder queries are
/// authorized by a bearer-style token, song and settings queries by a
/// session-cookie string. A 401 on either endpoint family means the
/// corresponding credential here is stale.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Bearer token for folder-listing requests
    #[serde(default = "default_token")]
    pub folder_token: String,

    /// Session-cookie string for song-listing and settings requests
    #[serde(default = "default_cookies")]
    pub song_cookies: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            folder_token: default_token(),
            song_cookies: default_cookies(),
        }
    }
}

/// Export behavior settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Base directory the folder tree is mirrored into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Location of the persisted cache snapshot
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    /// Fixed delay inserted before every API request, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Number of songs requested per page (1-100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum folder depth to traverse; `None` means unlimited
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Ceiling on total files downloaded in a run; `None` means unlimited
    #[serde(default)]
    pub download_limit: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cache_file: default_cache_file(),
            request_delay_ms: default_request_delay_ms(),
            page_size: default_page_size(),
            max_depth: None,
            download_limit: None,
        }
    }
}

/// Remote catalog endpoints.
///
/// Templates use `{page_size}`, `{offset}`, `{folder}` and `{song_id}`
/// placeholders substituted at request time.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Paginated song-listing endpoint template
    #[serde(default = "default_song_list_template")]
    pub song_list_template: String,

    /// Folder-listing endpoint (POST, depth-1 children filter)
    #[serde(default = "default_folder_list_url")]
    pub folder_list_url: String,

    /// Per-song settings endpoint template
    #[serde(default = "default_song_settings_template")]
    pub song_settings_template: String,

    /// Service name, embedded as the album tag of every exported file
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            song_list_template: default_song_list_template(),
            folder_list_url: default_folder_list_url(),
            song_settings_template: default_song_settings_template(),
            service_name: default_service_name(),
        }
    }
}

fn default_token() -> String {
    TOKEN_PLACEHOLDER.to_string()
}

fn default_cookies() -> String {
    COOKIES_PLACEHOLDER.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("_Exported")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("data_cache.json")
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_page_size() -> u32 {
    100
}

fn default_song_list_template() -> String {
    "https://www.udio.com/api/songs/me?likedOnly=false&publishedOnly=false&includeDisliked=true&onlyTrees=false&searchTerm=&sort=created_at&readOnly=true&pageSize={page_size}&pageParam={offset}&inFolder={folder}".to_string()
}

fn default_folder_list_url() -> String {
    "https://www.udio.com/api/v2/unchartedlabs.dataapi.v1.FolderService/ListFolders".to_string()
}

fn default_song_settings_template() -> String {
    "https://www.udio.com/api/songs/{song_id}/settings".to_string()
}

fn default_service_name() -> String {
    "Udio".to_string()
}

impl ExporterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to defaults; unknown fields are
    /// ignored so the file stays forward-compatible.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&raw).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Pre-flight validation.
    ///
    /// Runs before any side effect and rejects missing or placeholder
    /// credentials with an actionable message.
    pub fn validate(&self) -> Result<()> {
        if self.auth.folder_token.is_empty() || self.auth.folder_token == TOKEN_PLACEHOLDER {
            return Err(Error::Config(
                "auth.folder_token has not been set. \
                 Fill in the bearer token for folder requests in the config file."
                    .to_string(),
            ));
        }

        if self.auth.song_cookies.is_empty() || self.auth.song_cookies == COOKIES_PLACEHOLDER {
            return Err(Error::Config(
                "auth.song_cookies has not been set. \
                 Fill in the session-cookie string for song requests in the config file."
                    .to_string(),
            ));
        }

        if self.export.page_size == 0 || self.export.page_size > 100 {
            return Err(Error::Config(format!(
                "export.page_size must be between 1 and 100, got {}",
                self.export.page_size
            )));
        }

        if self.export.request_delay_ms > 60_000 {
            return Err(Error::Config(
                "export.request_delay_ms exceeds maximum of 60 seconds".to_string(),
            ));
        }

        Ok(())
    }
}
