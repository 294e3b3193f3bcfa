//! Depth-first crawl of the remote folder tree.

use core_catalog::CatalogClient;
use core_library::LibraryCache;
use futures_util::future::BoxFuture;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::materialize::{sanitize_component, Materializer};
use crate::stats::RunStats;

/// Outcome of visiting a folder subtree.
///
/// `LimitReached` unwinds the whole traversal: once the download budget is
/// hit, no ancestor continues with its remaining children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Continue,
    LimitReached,
}

/// Crawl bounds and output location.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Maximum folder depth to descend into; the root is depth 0. `None`
    /// means unbounded.
    pub max_depth: Option<u32>,
    /// Maximum number of files to download this run. `None` means
    /// unbounded.
    pub download_limit: Option<u64>,
}

/// Walks the folder tree in pre-order, materializing songs before
/// descending into subfolders.
pub struct Exporter {
    catalog: CatalogClient,
    materializer: Materializer,
    cache: LibraryCache,
    stats: RunStats,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        catalog: CatalogClient,
        materializer: Materializer,
        cache: LibraryCache,
        options: ExportOptions,
    ) -> Self {
        Self {
            catalog,
            materializer,
            cache,
            stats: RunStats::default(),
            options,
        }
    }

    /// Run the crawl from the root folder.
    pub async fn run(&mut self) {
        if let Err(e) = std::fs::create_dir_all(&self.options.output_dir) {
            error!(
                dir = %self.options.output_dir.display(),
                error = %e,
                "Cannot create output directory"
            );
            return;
        }

        info!(dir = %self.options.output_dir.display(), "Starting export");

        let root = self.options.output_dir.clone();
        if self.visit(None, root, 0).await == Traversal::LimitReached {
            info!(
                limit = self.options.download_limit,
                "Download limit reached, stopping"
            );
        }
    }

    /// Persist the cache and report the run counters. Safe to call after an
    /// interrupted run; everything already downloaded is on disk and cached.
    pub fn finish(&self) {
        self.cache.persist();
        self.stats.report();
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn cache(&self) -> &LibraryCache {
        &self.cache
    }

    /// Visit one folder: materialize its songs, then recurse into its
    /// subfolders. Boxed because the recursion depth follows the remote
    /// tree.
    fn visit(
        &mut self,
        folder_id: Option<String>,
        path: PathBuf,
        depth: u32,
    ) -> BoxFuture<'_, Traversal> {
        Box::pin(async move {
            if let Some(max) = self.options.max_depth {
                if depth > max {
                    warn!(depth, max, "Depth limit reached, not descending");
                    return Traversal::Continue;
                }
            }

            let songs = self
                .catalog
                .list_songs(folder_id.as_deref(), &mut self.cache)
                .await;
            self.stats.songs_found += songs.len() as u64;

            for song in &songs {
                if self.limit_reached() {
                    return Traversal::LimitReached;
                }
                if self
                    .materializer
                    .materialize(song, &path, &self.catalog, &mut self.cache)
                    .await
                {
                    self.stats.files_downloaded += 1;
                    if self.limit_reached() {
                        return Traversal::LimitReached;
                    }
                }
            }

            let folders = self
                .catalog
                .list_folders(folder_id.as_deref(), &mut self.cache)
                .await;
            self.stats.folders_found += folders.len() as u64;

            for folder in folders {
                let Some(child_id) = folder.id.clone() else {
                    warn!(name = %folder.name, "Folder without id, skipping");
                    continue;
                };

                let child_path = path.join(sanitize_component(&folder.name));
                if let Err(e) = std::fs::create_dir_all(&child_path) {
                    error!(
                        dir = %child_path.display(),
                        error = %e,
                        "Cannot create folder, skipping subtree"
                    );
                    continue;
                }

                debug!(folder = %folder.name, depth = depth + 1, "Entering folder");
                if self.visit(Some(child_id), child_path, depth + 1).await
                    == Traversal::LimitReached
                {
                    return Traversal::LimitReached;
                }
            }

            Traversal::Continue
        })
    }

    fn limit_reached(&self) -> bool {
        self.options
            .download_limit
            .is_some_and(|limit| self.stats.files_downloaded >= limit)
    }
}
