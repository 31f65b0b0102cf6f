//! Local caching layer
//!
//! Asset files are cached on disk keyed by their source URL; owner queries
//! are tracked in memory to flag overly frequent polling.

pub mod file_cache;
pub mod throttle;

pub use file_cache::{cache_file_name, AssetCache, CACHE_FILE_PREFIX, ERROR_FILE};
pub use throttle::ThrottleTracker;
