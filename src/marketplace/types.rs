//! Marketplace API types and cached asset records
//!
//! The owner-assets document is kept as raw JSON for callers; `OwnerAssets`
//! is a lenient typed view over the few fields the daemon itself reads.

use reqwest::{Response, Url};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::SystemTime;

/// Deserialize an identifier that might be encoded as a string, a number or null.
/// Marketplace token IDs are strings on most contracts but plain numbers on some.
fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct FlexibleIdVisitor;

    impl<'de> de::Visitor<'de> for FlexibleIdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, an integer, or null")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(FlexibleIdVisitor)
}

/// One asset entry from the owner-assets listing
#[derive(Debug, Clone, Deserialize)]
pub struct AssetSummary {
    /// Token ID within its contract
    #[serde(default, deserialize_with = "deserialize_flexible_id")]
    pub token_id: String,
    /// Display name, if the asset has one
    #[serde(default)]
    pub name: Option<String>,
    /// Full-size image URL
    #[serde(default)]
    pub image_url: Option<String>,
    /// Preview image URL
    #[serde(default)]
    pub image_preview_url: Option<String>,
}

impl AssetSummary {
    /// Best image URL for display: preview first, then full size
    pub fn display_image(&self) -> Option<&str> {
        self.image_preview_url
            .as_deref()
            .or(self.image_url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

/// Typed view of the owner-assets document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerAssets {
    #[serde(default)]
    pub assets: Vec<AssetSummary>,
}

impl OwnerAssets {
    /// Read the typed view out of a raw document, ignoring unknown fields
    pub fn from_document(doc: &serde_json::Value) -> Result<Self, serde_json::Error> {
        OwnerAssets::deserialize(doc)
    }
}

/// An open download connection, consumed by the file cache
#[derive(Debug)]
pub struct DownloadDescriptor {
    /// Resolved URL
    pub url: Url,
    /// Declared content length (always positive)
    pub content_length: u64,
    /// Response whose body has not been read yet
    pub response: Response,
}

/// A file present in the local asset cache
#[derive(Debug, Clone)]
pub struct CachedAsset {
    /// URL the file was downloaded from
    pub source_url: String,
    /// Path of the cached file
    pub local_path: PathBuf,
    /// Whether the file was already cached before this request
    pub existed: bool,
    /// Last modification time (refreshed on every cache hit)
    pub modified: SystemTime,
}

impl CachedAsset {
    /// File name within the cache directory
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
