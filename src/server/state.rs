//! Application state shared across handlers.

use crate::config::Config;
use crate::imaging::DerivationEngine;
use crate::listing::{self, Listing, ListingCache};
use crate::resolver::PathResolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Maps request paths under the serving root.
    pub resolver: Arc<PathResolver>,
    /// Directory listing cache.
    pub listings: ListingCache,
    /// Derivative image generator.
    pub engine: DerivationEngine,
}

impl AppState {
    /// Create state serving `root`.
    pub fn new(config: Config, root: PathBuf) -> Self {
        Self {
            resolver: Arc::new(PathResolver::new(root)),
            listings: ListingCache::new(config.cache.dir.clone()),
            engine: DerivationEngine::new(&config.images),
            config: Arc::new(config),
        }
    }

    /// Listing document for a directory, using the cache when available.
    ///
    /// Never fails: an unreadable directory yields (and caches) an empty
    /// listing, and a failed cache write still returns the fresh document.
    pub async fn listing(&self, request_path: &str, dir: &Path) -> Vec<u8> {
        let key = ListingCache::key(request_path);

        if let Some(data) = self.cached_listing(&key).await {
            tracing::debug!(path = request_path, "Listing cache hit");
            return data;
        }

        let _guard = self.listings.lock(&key).await;

        // Another request may have filled the entry while we waited.
        if let Some(data) = self.cached_listing(&key).await {
            return data;
        }

        tracing::debug!(path = request_path, "Listing cache miss");

        let listing = listing::list_directory(dir).await.unwrap_or_else(|e| {
            tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory");
            Listing::default()
        });

        match self.listings.put(&key, &listing).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(path = request_path, error = %e, "Failed to write listing cache");
                listing.to_bytes().unwrap_or_else(|_| b"{\"entries\":[]}".to_vec())
            }
        }
    }

    async fn cached_listing(&self, key: &str) -> Option<Vec<u8>> {
        match self.listings.get(key).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read listing cache");
                None
            }
        }
    }
}
