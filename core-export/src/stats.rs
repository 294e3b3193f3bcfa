//! Run counters reported when a crawl ends.

use tracing::info;

/// Counters accumulated over one crawl, reported once at the end
/// regardless of whether the run completed, hit a budget or was
/// interrupted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Subfolders discovered (cache hits included).
    pub folders_found: u64,
    /// Songs listed across all visited folders.
    pub songs_found: u64,
    /// Files actually downloaded this run; skips do not count.
    pub files_downloaded: u64,
}

impl RunStats {
    pub fn report(&self) {
        info!(
            folders = self.folders_found,
            songs = self.songs_found,
            downloaded = self.files_downloaded,
            "Export finished"
        );
    }
}
