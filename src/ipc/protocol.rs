//! IPC protocol definitions
//!
//! This module defines the JSON protocol used between local clients and the
//! asset daemon over a Unix domain socket. One command per line, one
//! response per command.

use serde::{Deserialize, Serialize};

use crate::raster::PixelFormat;

/// Protocol version for future compatibility
pub const PROTOCOL_VERSION: u32 = 1;

/// Commands sent from clients to the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Query the marketplace for an owner's assets
    QueryBalance {
        /// Owner address
        address: String,
    },
    /// Resolve an asset URL to a cached file
    FetchFile {
        /// Asset URL
        url: String,
    },
    /// Render a cached SVG asset
    FetchBitmap {
        /// Asset URL
        url: String,
        /// Target width in pixels
        width: u32,
        /// Optional path to write the bitmap to as PNG
        #[serde(default)]
        output: Option<String>,
    },
    /// Get daemon status
    GetStatus,
}

/// Responses sent from the daemon to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    /// Error response
    #[serde(rename_all = "camelCase")]
    Error {
        /// Error message
        error: String,
    },
    /// Owner assets document (null when the query failed)
    #[serde(rename_all = "camelCase")]
    Balance {
        address: String,
        assets: Option<serde_json::Value>,
    },
    /// Cached file name (`"error"` when the fetch failed)
    #[serde(rename_all = "camelCase")]
    File {
        name: String,
        /// Full path when the file exists
        path: Option<String>,
    },
    /// Rendered bitmap description
    #[serde(rename_all = "camelCase")]
    Bitmap {
        width: u32,
        height: u32,
        format: PixelFormat,
        placeholder: bool,
        /// Where the PNG was written, if requested
        output: Option<String>,
    },
    /// Status response with daemon state
    #[serde(rename_all = "camelCase")]
    Status {
        /// Protocol version
        version: u32,
        /// Whether daemon is healthy
        healthy: bool,
        /// Files in the asset cache
        cached_files: usize,
        /// Owner addresses with a recorded query
        tracked_addresses: u64,
        /// Cache hits since start
        cache_hits: u64,
        /// Cache misses since start
        cache_misses: u64,
    },
}

/// Parse a JSON command from bytes
pub fn parse_command(data: &[u8]) -> Result<Command, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Serialize a response to JSON bytes
pub fn serialize_response(response: &Response) -> Result<Vec<u8>, serde_json::Error> {
    let mut json = serde_json::to_vec(response)?;
    json.push(b'\n'); // Add newline delimiter
    Ok(json)
}
