//! Error types for the lookup orchestrator.

use thiserror::Error;
use watershed_geocode::GeocodeError;

/// Lookup failures.
///
/// Rejected addresses and points outside coverage are not errors; they are
/// [`LookupOutcome`](crate::LookupOutcome) variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    /// Input contained no address text.
    #[error("Address is empty")]
    EmptyAddress,

    /// Every geocoding provider failed or returned nothing.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// Unexpected failure during containment or derivation.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;
