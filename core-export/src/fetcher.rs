//! Cover art downloader.

use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use core_library::CoverFetcher;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// [`CoverFetcher`] backed by the shared HTTP client.
///
/// Cover assets are served from a public CDN, so no auth headers are
/// attached.
pub struct HttpCoverFetcher {
    http: Arc<dyn HttpClient>,
    headers: HashMap<String, String>,
}

impl HttpCoverFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            headers: HashMap::new(),
        }
    }
}

#[async_trait]
impl CoverFetcher for HttpCoverFetcher {
    async fn download(&self, url: &str, dest: &Path) -> bridge_traits::Result<()> {
        self.http.download_to_file(url, &self.headers, dest).await
    }
}
