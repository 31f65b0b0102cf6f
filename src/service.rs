//! Asset Service
//!
//! Ties together the marketplace client, the owner polling tracker and the
//! local file cache. Every public operation has a sentinel form that never
//! fails (absent document, `"error"` file name, placeholder bitmap) and a
//! `try_` form that reports the error category.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{AssetCache, ThrottleTracker, ERROR_FILE};
use crate::config::Config;
use crate::marketplace::{AssetError, CachedAsset, MarketplaceClient};
use crate::raster::{self, Bitmap};

/// Marketplace query and asset cache service
///
/// Owns its polling tracker: a new service starts with no access records.
pub struct AssetService {
    client: MarketplaceClient,
    cache: AssetCache,
    throttle: ThrottleTracker,
}

impl AssetService {
    /// Create a service from configuration
    ///
    /// Prunes old cache files when `max_cache_age` is configured.
    pub fn new(config: &Config) -> Result<Self, AssetError> {
        let client = MarketplaceClient::new(config)?;
        let cache = AssetCache::new(config.cache_dir.clone())?
            .with_timeouts(config.read_timeout, config.fetch_wait_timeout);

        if let Some(max_age) = config.max_cache_age {
            cache.prune_older_than(max_age);
        }

        Ok(Self {
            client,
            cache,
            throttle: ThrottleTracker::new(config.poll_interval),
        })
    }

    /// Query the assets held by an owner address
    ///
    /// # Returns
    /// The parsed marketplace document, or None on any failure
    pub async fn query_balance(&self, address: &str) -> Option<serde_json::Value> {
        match self.try_query_balance(address).await {
            Ok(document) => Some(document),
            Err(e) => {
                warn!(owner = address, kind = e.kind(), error = %e, "Marketplace query failed");
                None
            }
        }
    }

    /// Query the assets held by an owner address, reporting failures
    pub async fn try_query_balance(&self, address: &str) -> Result<serde_json::Value, AssetError> {
        self.throttle.check(address);
        let result = self.client.fetch_owner_assets(address).await;
        self.throttle.record(address);
        result
    }

    /// Resolve an asset URL to a cached file, downloading it if needed
    ///
    /// # Returns
    /// The cached file name, or `"error"` on any failure
    pub async fn fetch_file(&self, url: &str, cancel: &CancellationToken) -> String {
        match self.try_fetch_file(url, cancel).await {
            Ok(asset) => asset.file_name(),
            Err(e) => {
                warn!(url = url, kind = e.kind(), error = %e, "Asset fetch failed");
                ERROR_FILE.to_string()
            }
        }
    }

    /// Resolve an asset URL to a cached file, reporting failures
    pub async fn try_fetch_file(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<CachedAsset, AssetError> {
        let client = &self.client;
        self.cache
            .get_or_fetch(url, cancel, |parsed| async move {
                client.open_download(&parsed).await
            })
            .await
    }

    /// Render a cached SVG asset at `width` pixels
    ///
    /// # Returns
    /// The rendered bitmap, or the placeholder on any failure
    pub async fn fetch_bitmap(&self, url: &str, width: u32, cancel: &CancellationToken) -> Bitmap {
        match self.try_fetch_bitmap(url, width, cancel).await {
            Ok(bitmap) => bitmap,
            Err(e) => {
                warn!(url = url, kind = e.kind(), error = %e, "Asset render failed, using placeholder");
                Bitmap::placeholder()
            }
        }
    }

    /// Render a cached SVG asset at `width` pixels, reporting failures
    pub async fn try_fetch_bitmap(
        &self,
        url: &str,
        width: u32,
        cancel: &CancellationToken,
    ) -> Result<Bitmap, AssetError> {
        let asset = self.try_fetch_file(url, cancel).await?;
        let data = tokio::fs::read(&asset.local_path).await?;
        debug!(url = url, size = data.len(), width = width, "Rasterizing cached asset");

        let bitmap = tokio::task::spawn_blocking(move || raster::rasterize_svg(&data, width))
            .await
            .map_err(|e| AssetError::Render(format!("Render task failed: {}", e)))??;

        info!(
            url = url,
            width = bitmap.width,
            height = bitmap.height,
            "Rendered asset bitmap"
        );
        Ok(bitmap)
    }

    /// The local file cache
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// The owner polling tracker
    pub fn throttle(&self) -> &ThrottleTracker {
        &self.throttle
    }
}
