//! # Desktop Transport Bridge
//!
//! Desktop implementation of the transport traits, backed by `reqwest`.

pub mod http;

pub use http::ReqwestHttpClient;
