//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the exporter:
//! - Configuration loading and fail-fast validation
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other modules depend on. It
//! establishes the logging conventions and the configuration surface used
//! throughout the system.

pub mod config;
pub mod error;
pub mod logging;

pub use config::ExporterConfig;
pub use error::{Error, Result};
