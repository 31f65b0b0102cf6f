//! Marketplace API client

pub mod client;
pub mod errors;
pub mod types;

pub use client::MarketplaceClient;
pub use errors::AssetError;
pub use types::*;
