//! Command-line entry point for the exporter.

use anyhow::Context;
use bridge_desktop::ReqwestHttpClient;
use bridge_traits::http::HttpClient;
use clap::Parser;
use core_catalog::{CatalogClient, CatalogConfig};
use core_export::{ExportOptions, Exporter, Materializer};
use core_library::LibraryCache;
use core_metadata::LoftyTagWriter;
use core_runtime::logging::{init_logging, LogLevel, LoggingConfig};
use core_runtime::ExporterConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Mirror a remote music library's folder tree to local disk.
#[derive(Debug, Parser)]
#[command(name = "tunevault", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "tunevault.toml")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the maximum folder depth to descend into (root is 0)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Override the maximum number of files to download this run
    #[arg(long)]
    limit: Option<u64>,

    /// Write a per-run log file into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut logging = LoggingConfig::default();
    if args.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    if let Some(dir) = &args.log_dir {
        logging = logging.with_log_dir(dir);
    }
    init_logging(logging)?;

    let mut config = ExporterConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(output) = args.output {
        config.export.output_dir = output;
    }
    if let Some(depth) = args.max_depth {
        config.export.max_depth = Some(depth);
    }
    if let Some(limit) = args.limit {
        config.export.download_limit = Some(limit);
    }

    config.validate()?;

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    let catalog = CatalogClient::new(
        http.clone(),
        CatalogConfig {
            song_list_template: config.api.song_list_template.clone(),
            folder_list_url: config.api.folder_list_url.clone(),
            song_settings_template: config.api.song_settings_template.clone(),
            folder_token: config.auth.folder_token.clone(),
            song_cookies: config.auth.song_cookies.clone(),
            page_size: config.export.page_size,
            request_delay: Duration::from_millis(config.export.request_delay_ms),
        },
    );

    let tagger = Arc::new(LoftyTagWriter::new(config.api.service_name.clone()));
    let materializer = Materializer::new(http, tagger);
    let cache = LibraryCache::open(&config.export.cache_file);

    let mut exporter = Exporter::new(
        catalog,
        materializer,
        cache,
        ExportOptions {
            output_dir: config.export.output_dir.clone(),
            max_depth: config.export.max_depth,
            download_limit: config.export.download_limit,
        },
    );

    // Ctrl-C drops the in-flight crawl; everything already downloaded is on
    // disk and the cache has been persisted along the way.
    tokio::select! {
        _ = exporter.run() => {}
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping after in-flight work");
        }
    }

    exporter.finish();
    Ok(())
}
