//! # Transport Bridge Traits
//!
//! Abstraction traits for the network transport used by the export engine.
//!
//! ## Overview
//!
//! This crate defines the contract between the crawl-and-materialize core and
//! the concrete HTTP stack. The core only ever sees an opaque
//! [`HttpClient`](http::HttpClient) capability: it can execute a request and
//! inspect the status/body, or stream a large binary body straight to disk.
//! Everything HTTP-specific (connection pooling, TLS, redirects) lives behind
//! this seam in `bridge-desktop`.
//!
//! Keeping the transport behind a trait is what makes the engine testable:
//! tests inject a mock client and simulate pagination, 401 responses, and
//! network failures without any sockets.

pub mod error;
pub mod http;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
