//! Local Asset File Cache
//!
//! Caches downloaded asset files on local disk under names derived from
//! their source URL, so repeated requests for one asset never hit the network.
//! Files are written to a temp file and renamed into place, so a partial
//! download is never visible as a cache hit.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use futures_util::StreamExt;
use moka::sync::Cache;
use reqwest::Url;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::marketplace::{AssetError, CachedAsset, DownloadDescriptor};

/// Returned by sentinel fetch operations in place of a file name
pub const ERROR_FILE: &str = "error";

/// Prefix marking files owned by the cache
pub const CACHE_FILE_PREFIX: &str = "_cached_";

/// Suffix of in-progress downloads
const TEMP_SUFFIX: &str = ".tmp";

/// Size of the buffer between the response stream and the file
const DOWNLOAD_BUFFER_SIZE: usize = 64 * 1024;

/// Longest wait for response headers or the next body chunk
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest wait for another task's download of the same file
pub const DEFAULT_FETCH_WAIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Derive the cache file name for a URL
///
/// Keeps the last two path segments so that same-named files in different
/// directories do not collide.
pub fn cache_file_name(url: &str) -> String {
    let tail = match url.rfind('/') {
        Some(last) => match url[..last].rfind('/') {
            Some(second) => &url[second + 1..],
            None => &url[last + 1..],
        },
        None => url,
    };

    format!("{}{}", CACHE_FILE_PREFIX, tail)
        .replace('/', "-")
        .replace(':', "_")
}

/// Local disk cache for downloaded asset files
pub struct AssetCache {
    /// Root directory for cached files
    cache_dir: PathBuf,
    /// Serializes concurrent downloads of the same file; an entry lives
    /// while some task holds or waits on it
    fetch_locks: Cache<String, Arc<Mutex<()>>>,
    /// Stall limit for a single download read
    read_timeout: Duration,
    /// Limit on waiting for a concurrent download of the same file
    fetch_wait_timeout: Duration,
    /// Requests served from disk
    hits: AtomicU64,
    /// Requests that went to the network
    misses: AtomicU64,
}

impl AssetCache {
    /// Open (creating if needed) a cache rooted at `cache_dir`
    pub fn new(cache_dir: PathBuf) -> Result<Self, AssetError> {
        fs::create_dir_all(&cache_dir)?;

        let fetch_locks = Cache::builder().name("asset_fetch_locks").build();

        let cache = Self {
            cache_dir,
            fetch_locks,
            read_timeout: DEFAULT_READ_TIMEOUT,
            fetch_wait_timeout: DEFAULT_FETCH_WAIT_TIMEOUT,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        };

        // Clean up any stale temp files from previous runs
        cache.cleanup();

        info!(cache_dir = %cache.cache_dir.display(), "Asset cache initialized");

        Ok(cache)
    }

    /// Override the download stall and lock wait limits
    pub fn with_timeouts(mut self, read_timeout: Duration, fetch_wait_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self.fetch_wait_timeout = fetch_wait_timeout;
        self
    }

    /// Local path a URL is cached under
    pub fn local_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_file_name(url))
    }

    /// Whether a URL is cached, without touching it
    pub fn contains(&self, url: &str) -> bool {
        self.local_path(url).is_file()
    }

    /// Look up a cached URL, refreshing its modification time on a hit
    pub fn lookup(&self, url: &str) -> Option<CachedAsset> {
        let local_path = self.local_path(url);
        if !local_path.is_file() {
            return None;
        }

        let modified = match touch(&local_path) {
            Ok(now) => now,
            Err(e) => {
                warn!(path = %local_path.display(), error = %e, "Failed to touch cached file");
                fs::metadata(&local_path)
                    .and_then(|m| m.modified())
                    .unwrap_or_else(|_| SystemTime::now())
            }
        };

        Some(CachedAsset {
            source_url: url.to_string(),
            local_path,
            existed: true,
            modified,
        })
    }

    /// Get a cached file, downloading it if not present
    ///
    /// # Arguments
    /// * `url` - source URL of the asset
    /// * `cancel` - aborts the download; the partial file is discarded
    /// * `open` - opens the download connection on a cache miss
    pub async fn get_or_fetch<F, Fut>(
        &self,
        url: &str,
        cancel: &CancellationToken,
        open: F,
    ) -> Result<CachedAsset, AssetError>
    where
        F: FnOnce(Url) -> Fut,
        Fut: Future<Output = Result<DownloadDescriptor, AssetError>>,
    {
        let parsed = Url::parse(url).map_err(|e| AssetError::InvalidUrl(format!("{}: {}", url, e)))?;

        if let Some(hit) = self.lookup(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(url = url, "Asset cache HIT");
            return Ok(hit);
        }

        let key = cache_file_name(url);
        let lock = FetchLock {
            mutex: self.fetch_locks.get_with(key.clone(), || Arc::new(Mutex::new(()))),
            locks: &self.fetch_locks,
            key,
        };

        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AssetError::Cancelled),
            guard = tokio::time::timeout(self.fetch_wait_timeout, lock.mutex.lock()) => match guard {
                Ok(guard) => guard,
                Err(_) => {
                    warn!(url = url, "Timed out waiting for a concurrent download");
                    return Err(AssetError::Timeout);
                }
            },
        };

        // Another task may have completed the download while we waited
        if let Some(hit) = self.lookup(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(url = url, "Asset cache HIT after concurrent download");
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(url = url, "Asset cache MISS, downloading");

        let download = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AssetError::Cancelled),
            download = tokio::time::timeout(self.read_timeout, open(parsed)) => {
                download.map_err(|_| AssetError::Timeout)??
            }
        };

        let local_path = self.local_path(url);
        let size = self.store_stream(&local_path, download, cancel).await?;

        info!(
            url = url,
            local = %local_path.display(),
            size = size,
            "Stored asset in cache"
        );

        let modified = fs::metadata(&local_path)
            .and_then(|m| m.modified())
            .unwrap_or_else(|_| SystemTime::now());

        Ok(CachedAsset {
            source_url: url.to_string(),
            local_path,
            existed: false,
            modified,
        })
    }

    /// Stream a download into the cache
    async fn store_stream(
        &self,
        local_path: &Path,
        download: DownloadDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u64, AssetError> {
        let expected = download.content_length;

        // Dropping `tmp` on any early return removes the partial file
        let tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.cache_dir)?;
        let file = tokio::fs::File::from_std(tmp.as_file().try_clone()?);
        let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_SIZE, file);

        let mut stream = download.response.bytes_stream();
        let mut received: u64 = 0;

        loop {
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(url = %download.url, received = received, "Download cancelled");
                    return Err(AssetError::Cancelled);
                }
                chunk = tokio::time::timeout(self.read_timeout, stream.next()) => match chunk {
                    Ok(chunk) => chunk,
                    Err(_) => {
                        warn!(url = %download.url, received = received, "Download stalled");
                        return Err(AssetError::Timeout);
                    }
                },
            };

            match chunk {
                Some(chunk) => {
                    let chunk = chunk?;
                    writer.write_all(&chunk).await?;
                    received += chunk.len() as u64;
                }
                None => break,
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;

        if received != expected {
            return Err(AssetError::Truncated { expected, received });
        }

        tmp.persist(local_path).map_err(|e| AssetError::Io(e.error))?;

        Ok(received)
    }

    /// Clean up stale temp files on startup
    pub fn cleanup(&self) {
        if let Ok(read_dir) = fs::read_dir(&self.cache_dir) {
            for entry in read_dir.flatten() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
                    debug!(path = %entry.path().display(), "Removing stale temp file");
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
    }

    /// Remove cached files not touched within `max_age`
    ///
    /// # Returns
    /// Number of files removed
    pub fn prune_older_than(&self, max_age: Duration) -> usize {
        let now = SystemTime::now();
        let mut removed = 0;

        for path in self.cached_files() {
            let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }

            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), age_secs = age.as_secs(), "Pruned cached file");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to prune cached file"),
            }
        }

        if removed > 0 {
            info!(removed = removed, "Pruned old cached assets");
        }
        removed
    }

    /// Invalidate a specific cached file
    pub fn invalidate(&self, url: &str) {
        let local_path = self.local_path(url);
        if local_path.exists() {
            let _ = fs::remove_file(&local_path);
        }
        debug!(url = url, "Invalidated cached file");
    }

    /// Number of files currently in the cache
    pub fn cached_file_count(&self) -> usize {
        self.cached_files().len()
    }

    /// Get cache statistics
    ///
    /// Returns (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    /// Number of URLs with a download in progress or waited on
    pub fn in_flight_fetches(&self) -> u64 {
        self.fetch_locks.run_pending_tasks();
        self.fetch_locks.entry_count()
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cached_files(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.cache_dir) {
            Ok(read_dir) => read_dir
                .flatten()
                .filter(|e| e.file_name().to_string_lossy().starts_with(CACHE_FILE_PREFIX))
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// A per-key fetch lock, dropped from the lock map once no other task holds it
struct FetchLock<'a> {
    mutex: Arc<Mutex<()>>,
    locks: &'a Cache<String, Arc<Mutex<()>>>,
    key: String,
}

impl Drop for FetchLock<'_> {
    fn drop(&mut self) {
        // One reference is the map's, one is ours
        if Arc::strong_count(&self.mutex) <= 2 {
            self.locks.invalidate(&self.key);
        }
    }
}

/// Set a file's modification time to now
fn touch(path: &Path) -> std::io::Result<SystemTime> {
    let now = SystemTime::now();
    let file = fs::File::options().write(true).open(path)?;
    file.set_modified(now)?;
    Ok(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn descriptor(url: &str, body: &'static [u8], content_length: u64) -> DownloadDescriptor {
        let response = reqwest::Response::from(axum::http::Response::new(body.to_vec()));
        DownloadDescriptor {
            url: Url::parse(url).unwrap(),
            content_length,
            response,
        }
    }

    /// A response that sends `head` and then never completes
    fn stalled_descriptor(url: &str, head: &'static [u8], content_length: u64) -> DownloadDescriptor {
        let body = futures_util::stream::iter([Ok::<_, std::io::Error>(bytes::Bytes::from_static(head))])
            .chain(futures_util::stream::pending());
        let response = reqwest::Response::from(axum::http::Response::new(reqwest::Body::wrap_stream(body)));
        DownloadDescriptor {
            url: Url::parse(url).unwrap(),
            content_length,
            response,
        }
    }

    async fn never_open(url: Url) -> Result<DownloadDescriptor, AssetError> {
        panic!("unexpected download of {}", url)
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_cache_file_name_last_two_segments() {
        assert_eq!(
            cache_file_name("https://img.example.com/tokens/art/1234.svg"),
            "_cached_art-1234.svg"
        );
        assert_eq!(
            cache_file_name("https://img.example.com/tokens/other/1234.svg"),
            "_cached_other-1234.svg"
        );
    }

    #[test]
    fn test_cache_file_name_stable() {
        let url = "https://img.example.com/a/b/c.png";
        assert_eq!(cache_file_name(url), cache_file_name(url));
    }

    #[test]
    fn test_cache_file_name_short_urls() {
        assert_eq!(cache_file_name("https://host/a.svg"), "_cached_host-a.svg");
        assert_eq!(cache_file_name("/a.svg"), "_cached_a.svg");
        assert_eq!(cache_file_name("a.svg"), "_cached_a.svg");
        assert_eq!(cache_file_name("c:/x/y.svg"), "_cached_x-y.svg");
    }

    #[test]
    fn test_lookup_touches_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let url = "https://img.example.com/art/1.svg";

        assert!(cache.lookup(url).is_none());

        let path = cache.local_path(url);
        fs::write(&path, b"<svg/>").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        set_mtime(&path, old);

        let hit = cache.lookup(url).unwrap();
        assert!(hit.existed);
        assert_eq!(hit.local_path, path);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        assert!(mtime > old + Duration::from_secs(1800));
    }

    #[test]
    fn test_cleanup_removes_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".abc123.tmp"), b"partial").unwrap();
        fs::write(dir.path().join("_cached_a-b.svg"), b"<svg/>").unwrap();

        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();

        assert!(!dir.path().join(".abc123.tmp").exists());
        assert!(dir.path().join("_cached_a-b.svg").exists());
        assert_eq!(cache.cached_file_count(), 1);
    }

    #[test]
    fn test_prune_older_than() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();

        let old = cache.local_path("https://h/x/old.svg");
        let fresh = cache.local_path("https://h/x/fresh.svg");
        fs::write(&old, b"old").unwrap();
        fs::write(&fresh, b"fresh").unwrap();
        fs::write(dir.path().join("unrelated.txt"), b"keep").unwrap();
        set_mtime(&old, SystemTime::now() - Duration::from_secs(7 * 24 * 3600));
        set_mtime(&dir.path().join("unrelated.txt"), SystemTime::now() - Duration::from_secs(7 * 24 * 3600));

        let removed = cache.prune_older_than(Duration::from_secs(24 * 3600));

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[tokio::test]
    async fn test_get_or_fetch_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/1.svg";

        let asset = cache
            .get_or_fetch(url, &cancel, |u| async move {
                Ok::<_, AssetError>(descriptor(u.as_str(), b"<svg/>", 6))
            })
            .await
            .unwrap();
        assert!(!asset.existed);
        assert_eq!(asset.file_name(), "_cached_art-1.svg");
        assert_eq!(fs::read(&asset.local_path).unwrap(), b"<svg/>");

        let again = cache
            .get_or_fetch(url, &cancel, never_open)
            .await
            .unwrap();
        assert!(again.existed);
        assert_eq!(again.local_path, asset.local_path);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[tokio::test]
    async fn test_get_or_fetch_open_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/2.svg";

        let err = cache
            .get_or_fetch(url, &cancel, |u| async move {
                Err::<DownloadDescriptor, _>(AssetError::MissingContentLength(u.to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::MissingContentLength(_)));
        assert!(!cache.contains(url));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_truncated_download_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/3.svg";

        let err = cache
            .get_or_fetch(url, &cancel, |u| async move {
                Ok::<_, AssetError>(descriptor(u.as_str(), b"<svg", 100))
            })
            .await
            .unwrap_err();

        match err {
            AssetError::Truncated { expected, received } => {
                assert_eq!(expected, 100);
                assert_eq!(received, 4);
            }
            other => panic!("Expected Truncated, got {:?}", other),
        }
        assert!(!cache.contains(url));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();

        let err = cache
            .get_or_fetch("not a url/x.svg", &cancel, never_open)
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = cache
            .get_or_fetch("https://img.example.com/art/4.svg", &cancel, never_open)
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::Cancelled));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_download_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/5.svg";
        let opens = AtomicUsize::new(0);

        let open = |u: Url| {
            opens.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, AssetError>(descriptor(u.as_str(), b"<svg/>", 6))
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch(url, &cancel, open),
            cache.get_or_fetch(url, &cancel, open),
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.local_path, b.local_path);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_mid_stream_discards_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/6.svg";

        let (result, _) = tokio::join!(
            cache.get_or_fetch(url, &cancel, |u| async move {
                Ok::<_, AssetError>(stalled_descriptor(u.as_str(), b"<svg", 100))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                // The partial download is on disk as a temp file until cancelled
                assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
                cancel.cancel();
            },
        );

        assert!(matches!(result, Err(AssetError::Cancelled)));
        assert!(!cache.contains(url));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_stalled_download_times_out_and_frees_url() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf())
            .unwrap()
            .with_timeouts(Duration::from_millis(200), Duration::from_secs(5));
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/7.svg";

        let run = async {
            tokio::join!(
                cache.get_or_fetch(url, &cancel, |u| async move {
                    Ok::<_, AssetError>(stalled_descriptor(u.as_str(), b"<svg", 100))
                }),
                async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache
                        .get_or_fetch(url, &cancel, |u| async move {
                            Ok::<_, AssetError>(descriptor(u.as_str(), b"<svg/>", 6))
                        })
                        .await
                },
            )
        };
        let (stalled, second) = tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("fetches of a stalled URL must not hang");

        assert!(matches!(stalled, Err(AssetError::Timeout)));
        let second = second.unwrap();
        assert_eq!(fs::read(&second.local_path).unwrap(), b"<svg/>");
        assert_eq!(cache.in_flight_fetches(), 0);
    }

    #[tokio::test]
    async fn test_waiting_for_concurrent_download_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf())
            .unwrap()
            .with_timeouts(Duration::from_secs(60), Duration::from_millis(100));
        let holder_cancel = CancellationToken::new();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/8.svg";

        let (holder, waiter) = tokio::join!(
            cache.get_or_fetch(url, &holder_cancel, |u| async move {
                Ok::<_, AssetError>(stalled_descriptor(u.as_str(), b"<svg", 100))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let result = cache.get_or_fetch(url, &cancel, never_open).await;
                holder_cancel.cancel();
                result
            },
        );

        assert!(matches!(waiter, Err(AssetError::Timeout)));
        assert!(matches!(holder, Err(AssetError::Cancelled)));
    }

    #[tokio::test]
    async fn test_fetch_lock_kept_while_download_runs() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path().to_path_buf()).unwrap();
        let cancel = CancellationToken::new();
        let url = "https://img.example.com/art/9.svg";

        let (asset, _) = tokio::join!(
            cache.get_or_fetch(url, &cancel, |u| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, AssetError>(descriptor(u.as_str(), b"<svg/>", 6))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(cache.in_flight_fetches(), 1);
            },
        );

        assert!(!asset.unwrap().existed);
        assert_eq!(cache.in_flight_fetches(), 0);
    }
}
