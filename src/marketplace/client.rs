//! Marketplace API Client
//!
//! Queries the owner-assets listing and opens download connections for asset files.

use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;
use tracing::{debug, info};

use super::errors::AssetError;
use super::types::DownloadDescriptor;
use crate::config::Config;

/// Bodies this short are treated as "no document"
const MIN_DOCUMENT_LEN: usize = 10;

/// HTTP client for the marketplace API and asset hosts
#[derive(Clone)]
pub struct MarketplaceClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Owner-assets endpoint
    assets_url: String,
    /// Timeout applied to marketplace queries (downloads are bounded per read by the cache)
    request_timeout: Duration,
}

impl MarketplaceClient {
    /// Create a client from the service configuration
    pub fn new(config: &Config) -> Result<Self, AssetError> {
        let http_client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AssetError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            assets_url: config.assets_url(),
            request_timeout: config.request_timeout,
        })
    }

    fn assets_request(&self, address: &str) -> RequestBuilder {
        self.http_client
            .get(&self.assets_url)
            .query(&[
                ("owner", address),
                ("order_by", "current_price"),
                ("order_direction", "asc"),
            ])
            .timeout(self.request_timeout)
    }

    /// Fetch the assets held by an owner address
    ///
    /// # Returns
    /// The parsed response document
    pub async fn fetch_owner_assets(&self, address: &str) -> Result<serde_json::Value, AssetError> {
        debug!(owner = address, "Querying marketplace assets");

        let response = self.assets_request(address).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssetError::from_status(status.as_u16(), &body));
        }

        let body = response.text().await?;
        if body.len() <= MIN_DOCUMENT_LEN {
            return Err(AssetError::EmptyResponse);
        }

        let document: serde_json::Value = serde_json::from_str(&body)?;
        info!(owner = address, size = body.len(), "Fetched marketplace assets");
        Ok(document)
    }

    /// Open a download connection for an asset file
    ///
    /// Only responses that declare a positive content length are accepted;
    /// anything else is not treated as a file.
    pub async fn open_download(&self, url: &Url) -> Result<DownloadDescriptor, AssetError> {
        debug!(url = %url, "Opening asset download");

        let response = self.http_client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AssetError::from_status(status.as_u16(), url.as_str()));
        }

        match response.content_length() {
            Some(content_length) if content_length > 0 => Ok(DownloadDescriptor {
                url: url.clone(),
                content_length,
                response,
            }),
            _ => Err(AssetError::MissingContentLength(url.to_string())),
        }
    }
}
