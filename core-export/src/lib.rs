//! # Export Engine
//!
//! The crawl orchestrator and the song materializer: everything between
//! "list the catalog" ([`core_catalog`]) and "the file is on disk with
//! tags" ([`core_library::TagWriter`]).
//!
//! ## Overview
//!
//! [`Exporter`](crawl::Exporter) walks the remote folder tree depth-first
//! in pre-order, mirroring it under the output directory. At each folder
//! it first materializes every song, then descends into the subfolders.
//! Depth and download budgets can cut the walk short; a hit download
//! budget unwinds the whole traversal immediately.
//!
//! [`Materializer`](materialize::Materializer) handles a single song:
//! skip if the target file already exists, otherwise download, fetch the
//! generation settings, embed tags and stamp the file's timestamps from
//! the catalog's creation time.

pub mod crawl;
pub mod fetcher;
pub mod materialize;
pub mod stats;

pub use crawl::{ExportOptions, Exporter, Traversal};
pub use fetcher::HttpCoverFetcher;
pub use materialize::Materializer;
pub use stats::RunStats;
