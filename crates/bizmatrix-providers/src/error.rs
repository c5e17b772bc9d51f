use thiserror::Error;

/// Errors returned by either provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{provider} API request failed ({status}): {description}")]
    Api {
        provider: &'static str,
        status: u16,
        description: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("received an empty response from the {provider} API")]
    EmptyResponse { provider: &'static str },

    /// The directory needs either an address or coordinates.
    #[error("directory search requires a location (address or coordinates)")]
    LocationRequired,

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
