//! # Remote Catalog Client
//!
//! Client for the remote music-library catalog: paginated song listing,
//! folder listing, and lazy per-song settings retrieval.
//!
//! ## Overview
//!
//! The [`CatalogClient`](client::CatalogClient) sits between the crawl
//! orchestrator and the opaque transport. It owns the service's endpoint
//! shapes and credential headers, consults and updates the
//! [`LibraryCache`](core_library::LibraryCache) on every operation, and
//! absorbs the full error taxonomy:
//!
//! - HTTP 401 is fatal to that data source but never propagates — the
//!   operation logs which credential went stale and returns an empty result
//!   so the run can finish cleanly with partial progress.
//! - Any other transport, HTTP, or parse failure is logged and degrades to
//!   "this folder yielded what it yielded so far".
//!
//! A fixed delay is inserted before every request as rate-limiting courtesy
//! to the remote service.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CatalogClient, CatalogConfig};
pub use error::CatalogError;
