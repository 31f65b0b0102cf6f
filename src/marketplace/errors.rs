//! Asset Service Error Types
//!
//! Structured error handling for marketplace queries, asset downloads and
//! rasterization. Public sentinel operations log these and swallow them.

/// Asset service error types
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Malformed URL: {0}")]
    InvalidUrl(String),

    #[error("Response for {0} has no content length")]
    MissingContentLength(String),

    #[error("Download truncated: expected {expected} bytes, received {received}")]
    Truncated { expected: u64, received: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AssetError {
    /// Create an AssetError from an HTTP status code and response body
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            408 => AssetError::Timeout,
            _ => AssetError::Http(status, body.to_string()),
        }
    }

    /// Short label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            AssetError::InvalidUrl(_) => "invalid_url",
            AssetError::MissingContentLength(_) => "missing_content_length",
            AssetError::Truncated { .. } => "truncated",
            AssetError::Network(_) => "network",
            AssetError::Timeout => "timeout",
            AssetError::Http(_, _) => "http",
            AssetError::Parse(_) => "parse",
            AssetError::EmptyResponse => "empty_response",
            AssetError::Io(_) => "io",
            AssetError::Render(_) => "render",
            AssetError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for AssetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AssetError::Timeout
        } else if e.is_decode() {
            AssetError::Parse(e.to_string())
        } else if e.is_builder() {
            AssetError::InvalidUrl(e.to_string())
        } else if let Some(status) = e.status() {
            AssetError::Http(status.as_u16(), e.to_string())
        } else {
            AssetError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AssetError {
    fn from(e: serde_json::Error) -> Self {
        AssetError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(AssetError::from_status(408, ""), AssetError::Timeout));
        match AssetError::from_status(503, "unavailable") {
            AssetError::Http(status, body) => {
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: AssetError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "parse");
    }
}
