use thiserror::Error;

/// Errors returned by the CJ Dropshipping API client.
///
/// Each gateway operation has its own rejection kind carrying the vendor's
/// `message` verbatim; the remaining variants describe transport failures.
#[derive(Debug, Error)]
pub enum CjError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token exchange was rejected or returned no access token.
    #[error("CJ authentication failed: {0}")]
    Authentication(String),

    #[error("CJ product fetch failed: {0}")]
    ProductFetch(String),

    #[error("CJ category fetch failed: {0}")]
    CategoryFetch(String),

    #[error("CJ shipping calculation failed: {0}")]
    ShippingCalculation(String),

    #[error("CJ order creation failed: {0}")]
    OrderCreation(String),

    #[error("CJ order lookup failed: {0}")]
    OrderLookup(String),

    /// HTTP 401: the vendor no longer accepts the access token that was sent.
    #[error("CJ rejected the access token for {context}")]
    Unauthorized { context: String },

    /// A non-2xx status whose body was not a vendor envelope.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
