//! # Metadata Embedding
//!
//! Implementation of the [`TagWriter`](core_library::TagWriter) collaborator:
//! writes ID3v2 tags into downloaded audio files using the `lofty` crate and
//! embeds cover art transcoded to JPEG with the `image` crate.
//!
//! ## Overview
//!
//! For every materialized song the writer embeds:
//! - title and artist from the song record
//! - album fixed to the remote service's name
//! - year derived from the creation timestamp
//! - a serialized provenance payload (the full song record plus the
//!   generation settings) in the comment frame
//! - the cover image, when it can be downloaded and decoded
//!
//! Tag writing is strictly best-effort: the audio file is already saved when
//! the writer runs, so any failure here is logged and swallowed rather than
//! failing the download.

pub mod error;
pub mod tagger;

pub use error::MetadataError;
pub use tagger::LoftyTagWriter;
