//! Error types for geocoding providers and the resolver chain.

use thiserror::Error;

/// A single provider's failure.
///
/// Every variant is treated as transient by the resolver: it is logged and
/// the chain advances to the next provider. These never reach callers.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Request exceeded the per-call timeout.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Provider signalled a quota or rate limit (HTTP 429 or an API status).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Provider returned a 5xx.
    #[error("provider outage (HTTP {0})")]
    Outage(u16),

    /// Any other non-success HTTP status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Provider-level error status inside a 200 response (e.g. REQUEST_DENIED).
    #[error("provider rejected request: {status} {message}")]
    Rejected { status: String, message: String },

    /// Response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Connection or other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Map a reqwest error the same way for every HTTP adapter.
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout_ms: u64) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(timeout_ms)
        } else if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else if e.is_connect() {
            ProviderError::Transport(format!("failed to connect: {e}"))
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Resolver-level failure, surfaced to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// The chain is empty (no provider had its credentials configured).
    #[error("No geocoding providers are configured")]
    NoProviders,

    /// Every provider failed or returned no result.
    #[error("No geocoding provider could resolve '{address}': {details}")]
    Exhausted { address: String, details: String },

    /// Provider chain could not be constructed.
    #[error("Geocoder configuration error: {0}")]
    Config(String),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, GeocodeError>;
