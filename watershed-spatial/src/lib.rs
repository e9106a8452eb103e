//! # Watershed Spatial
//!
//! Boundary dataset loading and point-in-polygon containment for the
//! harmonized cross-border watershed collection.
//!
//! ## Architecture
//!
//! - **Loader**: reads a GeoJSON feature collection once, validates every
//!   feature, and fails the whole load on the first bad one
//! - **Envelope index**: an R-tree of polygon bounding boxes built in bulk
//! - **BoundarySet**: immutable records + index; read concurrently without locks
//! - **ContainmentQuery**: trait seam consumed by the lookup orchestrator
//!
//! ## Module Structure
//!
//! - `geometry` - GeoJSON/WKT parsing, bbox and geodesic area
//! - `dataset` - on-disk schema and per-feature decoding
//! - `loader` - `BoundarySetBuilder`, `load`
//! - `index` - R-tree envelope index
//! - `boundary_set` - the collection and its query pipeline
//! - `query` - `ContainmentQuery` trait
//! - `config` - loader configuration
//! - `error` - error types

pub mod boundary_set;
pub mod config;
mod dataset;
pub mod error;
pub mod geometry;
pub mod index;
pub mod loader;
pub mod query;

pub use boundary_set::{BoundarySet, DatasetSummary, QueryStats};
pub use config::IndexConfig;
pub use error::{DatasetError, Result, SpatialError};
pub use geometry::{BBox, GeometryMetadata, GeometryType};
pub use loader::{load, load_with_config, BoundarySetBuilder, LoadStats};
pub use query::ContainmentQuery;
