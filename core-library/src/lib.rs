//! # Core Library Model
//!
//! Data model and persistent cache for the export engine.
//!
//! ## Overview
//!
//! - [`models`] — the remote catalog's object model ([`Song`](models::Song),
//!   [`Folder`](models::Folder)) and the persisted
//!   [`CacheSnapshot`](models::CacheSnapshot). Unknown remote fields are
//!   carried verbatim so the cache file stays forward-compatible.
//! - [`cache`] — [`CacheStore`](cache::CacheStore) (durable JSON snapshot
//!   persistence) and [`LibraryCache`](cache::LibraryCache), the single
//!   source of truth for "has this folder been enumerated" and "has this
//!   song's settings been fetched". Every mutation that adds information is
//!   persisted immediately, so a crash loses at most the in-flight exchange.
//! - [`tags`] — the [`TagWriter`](tags::TagWriter) and
//!   [`CoverFetcher`](tags::CoverFetcher) collaborator traits sitting at the
//!   seam between the export engine and the metadata implementation.

pub mod cache;
pub mod models;
pub mod tags;

pub use cache::{CacheStore, LibraryCache};
pub use models::{CacheSnapshot, Folder, Song};
pub use tags::{CoverFetcher, TagWriter};
