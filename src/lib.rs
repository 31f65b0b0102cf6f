//! Asset cache daemon
//!
//! Queries a marketplace API for the assets an address owns, caches asset
//! files on local disk and renders SVG assets to bitmaps. Also carries the
//! platform-independent wallet front-end rules: home-screen event dispatch
//! and seed phrase input validation.

pub mod cache;
pub mod config;
pub mod events;
pub mod ipc;
pub mod marketplace;
pub mod raster;
pub mod seed;
pub mod service;

pub use cache::{AssetCache, ThrottleTracker, ERROR_FILE};
pub use config::Config;
pub use marketplace::{AssetError, CachedAsset, MarketplaceClient};
pub use raster::{Bitmap, PixelFormat};
pub use service::AssetService;
