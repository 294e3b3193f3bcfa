//! # Logging & Tracing Infrastructure
//!
//! Configures structured logging with the `tracing` crate, supporting:
//! - Pretty, compact and JSON output formats
//! - Module-level filtering via `EnvFilter`
//! - An optional per-run log file alongside console output
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{LoggingConfig, LogFormat, init_logging};
//!
//! let config = LoggingConfig::default()
//!     .with_format(LogFormat::Compact)
//!     .with_log_dir("logs");
//!
//! init_logging(config).expect("Failed to initialize logging");
//!
//! tracing::info!("Exporter started");
//! ```

use crate::error::{Error, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format for machine parsing
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Minimum log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level (defaults to info)
    pub level: Option<LogLevel>,
    /// Custom filter string (e.g., "core_catalog=debug,core_export=trace")
    pub filter: Option<String>,
    /// Directory for the per-run log file; `None` disables file logging
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set minimum log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Set custom filter string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Enable a per-run log file under the given directory
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Initialize the logging system.
///
/// This should be called once during application startup. Subsequent calls
/// will return an error.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;
    let file_layer = build_file_layer(&config)?;

    let stdout_layer: BoxedLayer = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stdout)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(io::stdout)
            .boxed(),
    };

    let mut layers: Vec<BoxedLayer> = vec![filter.boxed(), stdout_layer];
    if let Some(layer) = file_layer {
        layers.push(layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = if let Some(custom_filter) = &config.filter {
        custom_filter.clone()
    } else {
        let base_level = config.level.unwrap_or(LogLevel::Info).as_str();
        // Our crates at the requested level, noisy dependencies at warn
        format!(
            "tunevault={level},core_runtime={level},core_library={level},\
             core_catalog={level},core_metadata={level},core_export={level},\
             bridge_desktop={level},h2=warn,hyper=warn,reqwest=warn",
            level = base_level
        )
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| Error::Config(format!("Invalid log filter: {}", e)))
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn build_file_layer(config: &LoggingConfig) -> Result<Option<BoxedLayer>> {
    let Some(dir) = &config.log_dir else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

    let filename = format!("{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let file = File::create(dir.join(&filename))
        .map_err(|e| Error::Config(format!("Failed to create log file: {}", e)))?;

    let layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .boxed();

    Ok(Some(layer))
}
