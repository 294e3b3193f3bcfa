//! ID3v2 tag writer backed by `lofty`.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use core_library::{CoverFetcher, Song, TagWriter};
use image::{DynamicImage, ImageFormat};
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::tag::{Accessor, Tag, TagExt, TagType};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// Tag writer that embeds catalog metadata into downloaded audio files.
///
/// Failures never propagate past [`write_tags`](TagWriter::write_tags): the
/// audio file is already on disk when this runs, so a tagging problem
/// degrades the file instead of failing the download.
pub struct LoftyTagWriter {
    /// Remote service name, written as the album tag
    service_name: String,
}

impl LoftyTagWriter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Download the cover image next to the audio file, decode it and
    /// re-encode as baseline JPEG (RGBA sources are flattened to RGB).
    /// Returns `None` on any failure; the temp file is always removed.
    async fn fetch_cover(
        &self,
        audio_path: &Path,
        song: &Song,
        covers: &dyn CoverFetcher,
    ) -> Option<Vec<u8>> {
        let url = song.image_path.as_deref()?;
        let dir = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = dir.join(format!(".cover-{}.tmp", song.id));

        if let Err(e) = covers.download(url, &tmp).await {
            warn!(song_id = %song.id, error = %e, "Failed to download cover image");
            return None;
        }

        let raw = std::fs::read(&tmp);
        let _ = std::fs::remove_file(&tmp);

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                warn!(song_id = %song.id, error = %e, "Failed to read downloaded cover");
                return None;
            }
        };

        match transcode_to_jpeg(&raw) {
            Ok(jpeg) => Some(jpeg),
            Err(e) => {
                error!(song_id = %song.id, error = %e, "Failed to convert cover art");
                None
            }
        }
    }

    fn apply(
        &self,
        path: &Path,
        song: &Song,
        settings: Option<&Value>,
        cover: Option<Vec<u8>>,
    ) -> Result<()> {
        let mut tag = Tag::new(TagType::Id3v2);

        if let Some(data) = cover {
            tag.push_picture(Picture::new_unchecked(
                PictureType::CoverFront,
                Some(MimeType::Jpeg),
                None,
                data,
            ));
        }

        tag.set_title(song.title.clone().unwrap_or_default());
        tag.set_artist(song.artist.clone().unwrap_or_default());
        tag.set_album(self.service_name.clone());

        if let Some(created) = song.creation_timestamp() {
            tag.set_year(created.year() as u32);
        }

        tag.set_comment(provenance_comment(song, settings)?);

        tag.save_to_path(path, WriteOptions::default())?;
        info!(file = %path.display(), "Tags applied");
        Ok(())
    }
}

#[async_trait]
impl TagWriter for LoftyTagWriter {
    async fn write_tags(
        &self,
        path: &Path,
        song: &Song,
        settings: Option<&Value>,
        covers: &dyn CoverFetcher,
    ) {
        debug!(file = %path.display(), "Applying metadata");

        let cover = self.fetch_cover(path, song, covers).await;

        if let Err(e) = self.apply(path, song, settings, cover) {
            error!(file = %path.display(), error = %e, "Failed to write metadata");
        }
    }
}

/// Serialized copy of everything known about the song, embedded in the
/// comment frame for provenance.
fn provenance_comment(song: &Song, settings: Option<&Value>) -> Result<String> {
    let payload = json!({
        "ExportedData": {
            "song_details": song,
            "generation_settings": settings,
            "_export_info": {
                "exporter": "tunevault",
                "version": env!("CARGO_PKG_VERSION"),
                "export_date": Utc::now().to_rfc3339(),
            },
        }
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}

fn transcode_to_jpeg(data: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(data)?;
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(decoded.to_rgb8()).write_to(&mut buffer, ImageFormat::Jpeg)?;
    Ok(buffer.into_inner())
}
