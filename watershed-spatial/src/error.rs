//! Error types for the boundary dataset and containment index.

use std::path::PathBuf;
use thiserror::Error;
use watershed_core::Coordinate;

/// Startup-fatal errors raised while loading the boundary dataset.
///
/// Loading is all-or-nothing: any one of these aborts the whole load.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Dataset file missing or unreadable.
    #[error("Cannot read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid GeoJSON feature collection.
    #[error("Cannot parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Collection parsed but holds no features.
    #[error("Dataset {0} contains no watershed records")]
    Empty(PathBuf),

    /// Geometry coordinates fall outside WGS84 longitude/latitude bounds.
    #[error("Feature #{index} ({id}) has out-of-system coordinate ({lon}, {lat}); expected WGS84 degrees")]
    OutOfSystem {
        index: usize,
        id: String,
        lon: f64,
        lat: f64,
    },

    /// Two features share a `unique_id`.
    #[error("Duplicate unique_id '{id}' at features #{first} and #{second}")]
    DuplicateId {
        id: String,
        first: usize,
        second: usize,
    },

    /// Any other per-feature schema violation.
    #[error("Feature #{index} ({id}): {reason}")]
    InvalidFeature {
        index: usize,
        id: String,
        reason: String,
    },
}

impl DatasetError {
    pub(crate) fn invalid(index: usize, id: Option<&str>, reason: impl Into<String>) -> Self {
        DatasetError::InvalidFeature {
            index,
            id: id.unwrap_or("<no id>").to_string(),
            reason: reason.into(),
        }
    }
}

/// Query-time errors from the containment index.
///
/// These indicate internal inconsistencies; a point outside all polygons is
/// not an error.
#[derive(Error, Debug)]
pub enum SpatialError {
    /// Query coordinate is not a valid WGS84 position.
    #[error("Invalid query coordinate {0}")]
    InvalidCoordinate(Coordinate),

    /// Index and record storage disagree (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for containment queries.
pub type Result<T> = std::result::Result<T, SpatialError>;
