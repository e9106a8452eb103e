//! Loader and index configuration.

use serde::{Deserialize, Serialize};

/// Configuration for building a [`BoundarySet`](crate::BoundarySet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Fill in `area_sqkm` from the geometry (geodesic) when a feature omits it.
    /// When false, a missing area is a dataset error.
    /// Default: true
    pub compute_missing_area: bool,

    /// Minimum number of features for the dataset to be usable.
    /// Default: 1
    pub min_features: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            compute_missing_area: true,
            min_features: 1,
        }
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require (or not) an explicit area on every feature.
    pub fn with_compute_missing_area(mut self, compute: bool) -> Self {
        self.compute_missing_area = compute;
        self
    }

    /// Set the minimum feature count.
    pub fn with_min_features(mut self, min_features: usize) -> Self {
        self.min_features = min_features.max(1);
        self
    }
}
