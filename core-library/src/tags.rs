//! Collaborator traits for metadata embedding.
//!
//! The export engine does not know how tags are written; it hands the
//! downloaded file to a [`TagWriter`] together with the song record, the
//! optional settings payload, and a [`CoverFetcher`] capability the writer
//! can use to pull the cover image down itself.

use crate::models::Song;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Capability for downloading an auxiliary asset (the cover image) into the
/// working directory. Implemented by the export engine on top of the
/// transport bridge.
#[async_trait]
pub trait CoverFetcher: Send + Sync {
    async fn download(&self, url: &str, dest: &Path) -> bridge_traits::Result<()>;
}

/// Embeds extracted metadata into a downloaded audio file.
///
/// Contract: the implementation must leave the file's embedded metadata
/// updated (title, artist, album, year, provenance payload, cover art when
/// obtainable) and must never propagate a failure past this boundary. A
/// metadata-writing failure is logged and treated as a degraded but
/// successful download; the audio file itself is already saved and valid.
#[async_trait]
pub trait TagWriter: Send + Sync {
    async fn write_tags(
        &self,
        path: &Path,
        song: &Song,
        settings: Option<&Value>,
        covers: &dyn CoverFetcher,
    );
}
