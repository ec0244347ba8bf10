use thiserror::Error;

/// Errors returned by the Graph API client.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API returned an `{"error": {...}}` envelope.
    #[error("Graph API error (code {code}): {message}")]
    Api { message: String, code: i64 },

    /// Token expired, revoked, or missing permissions. Kept distinct from
    /// [`GraphError::Api`] so callers can surface a dedicated status.
    #[error("Graph API auth error: {0}")]
    Auth(String),

    /// Non-2xx HTTP status without a parseable Graph error envelope.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Guard against cycling pagination cursors.
    #[error("pagination limit reached for {user_id}: exceeded {max_pages} pages")]
    PaginationLimit { user_id: String, max_pages: usize },
}
