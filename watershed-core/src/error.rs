//! Error types for watershed-core

use thiserror::Error;

/// Result type alias using [`CodeError`]
pub type Result<T> = std::result::Result<T, CodeError>;

/// Errors raised while parsing or validating core model values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodeError {
    /// Malformed US Hydrologic Unit Code
    #[error("Invalid HUC code '{code}': {reason}")]
    InvalidHuc { code: String, reason: &'static str },

    /// Malformed BC Freshwater Atlas watershed code
    #[error("Invalid FWA watershed code '{code}': {reason}")]
    InvalidFwa { code: String, reason: &'static str },

    /// Malformed Standard Drainage Area Classification code
    #[error("Invalid SDAC code '{code}': {reason}")]
    InvalidSdac { code: String, reason: &'static str },

    /// Country tag outside {US, CA}
    #[error("Unknown country: {0}")]
    UnknownCountry(String),

    /// Data source tag not recognized
    #[error("Unknown data source: {0}")]
    UnknownDataSource(String),

    /// Record country disagrees with its code scheme
    #[error("Country {country} does not match {scheme} code")]
    CountryMismatch {
        country: &'static str,
        scheme: &'static str,
    },

    /// Latitude/longitude outside WGS84 bounds or not finite
    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Record-level invariant violated
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
