//! Wire types for the catalog API.

use core_library::{Folder, Song};
use serde::{Deserialize, Serialize};

/// Folder listings use a fixed large page; folder counts are small enough
/// that the service never paginates them in practice.
const FOLDER_PAGE_SIZE: u32 = 500;

/// One page of the song-listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SongListResponse {
    #[serde(default)]
    pub data: Vec<Song>,
}

/// Response of the folder-listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FolderListResponse {
    #[serde(default)]
    pub folders: Vec<Folder>,
}

/// Request payload for the folder-listing endpoint.
#[derive(Debug, Serialize)]
pub struct FolderListRequest {
    pub filter: FolderFilter,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct FolderFilter {
    pub depth: DepthRange,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepthRange {
    pub start: u32,
    pub end: u32,
}

impl FolderListRequest {
    /// Request only direct children of `parent_id` (or of the root when
    /// `None`).
    pub fn depth_one(parent_id: Option<&str>) -> Self {
        Self {
            filter: FolderFilter {
                depth: DepthRange { start: 1, end: 1 },
                parent_id: parent_id.map(str::to_string),
            },
            page_size: FOLDER_PAGE_SIZE,
        }
    }
}
