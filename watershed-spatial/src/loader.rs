//! Boundary dataset loader.
//!
//! Reads the harmonized feature collection once at startup and builds the
//! [`BoundarySet`]. Any invalid feature aborts the load; there is no partial
//! dataset.

use crate::boundary_set::BoundarySet;
use crate::config::IndexConfig;
use crate::dataset::{decode_feature, RawCollection};
use crate::error::DatasetError;
use crate::geometry::GeometryType;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use watershed_core::{NameTable, WatershedRecord};

/// Statistics gathered while loading a dataset.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Number of features decoded.
    pub features: usize,

    /// Number of single-polygon geometries.
    pub polygon_count: usize,

    /// Number of multipolygon geometries.
    pub multipolygon_count: usize,

    /// Total ring positions across all geometries.
    pub vertex_count: usize,

    /// Features whose area was computed from the geometry.
    pub computed_areas: usize,

    /// Entries in the name-by-code table.
    pub named_codes: usize,

    /// Wall-clock load time in milliseconds.
    pub elapsed_ms: u128,
}

/// Builds a [`BoundarySet`] from a dataset file or buffer.
#[derive(Debug, Clone, Default)]
pub struct BoundarySetBuilder {
    config: IndexConfig,
}

impl BoundarySetBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Load from a file on disk.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(BoundarySet, LoadStats), DatasetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.from_slice_at(&bytes, path)
    }

    /// Load from an in-memory buffer. `origin` labels errors.
    pub fn from_slice(
        &self,
        bytes: &[u8],
        origin: impl Into<PathBuf>,
    ) -> Result<(BoundarySet, LoadStats), DatasetError> {
        self.from_slice_at(bytes, &origin.into())
    }

    fn from_slice_at(
        &self,
        bytes: &[u8],
        path: &Path,
    ) -> Result<(BoundarySet, LoadStats), DatasetError> {
        let started = Instant::now();
        let collection: RawCollection =
            serde_json::from_slice(bytes).map_err(|source| DatasetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(kind) = collection.kind.as_deref() {
            if kind != "FeatureCollection" {
                return Err(DatasetError::invalid(
                    0,
                    None,
                    format!("expected a FeatureCollection, found '{kind}'"),
                ));
            }
        }
        if collection.features.is_empty() || collection.features.len() < self.config.min_features {
            return Err(DatasetError::Empty(path.to_path_buf()));
        }

        let mut stats = LoadStats::default();
        let mut records: Vec<WatershedRecord> = Vec::with_capacity(collection.features.len());
        let mut metadata = Vec::with_capacity(collection.features.len());
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();

        for (index, feature) in collection.features.into_iter().enumerate() {
            let decoded = decode_feature(index, feature, &self.config)?;
            let id = decoded.record.unique_id().to_string();
            if let Some(&first) = seen.get(&id) {
                return Err(DatasetError::DuplicateId {
                    id,
                    first,
                    second: index,
                });
            }
            seen.insert(id, index);

            match decoded.metadata.geom_type {
                GeometryType::Polygon => stats.polygon_count += 1,
                GeometryType::MultiPolygon => stats.multipolygon_count += 1,
            }
            stats.vertex_count += decoded.metadata.vertex_count;
            if decoded.area_computed {
                stats.computed_areas += 1;
            }
            records.push(decoded.record);
            metadata.push(decoded.metadata);
        }
        stats.features = records.len();

        let names: NameTable = collection.names.into_iter().collect();
        stats.named_codes = names.len();

        let set = BoundarySet::from_parts(records, metadata, names, collection.version);
        stats.elapsed_ms = started.elapsed().as_millis();

        debug!(
            polygons = stats.polygon_count,
            multipolygons = stats.multipolygon_count,
            vertices = stats.vertex_count,
            computed_areas = stats.computed_areas,
            "dataset decoded"
        );
        info!(
            path = %path.display(),
            records = stats.features,
            named_codes = stats.named_codes,
            version = set.version().unwrap_or("unversioned"),
            elapsed_ms = stats.elapsed_ms as u64,
            "watershed dataset loaded"
        );
        Ok((set, stats))
    }
}

/// Load a dataset with the default configuration.
pub fn load(path: impl AsRef<Path>) -> Result<BoundarySet, DatasetError> {
    BoundarySetBuilder::default().load(path).map(|(set, _)| set)
}

/// Load a dataset with an explicit configuration.
pub fn load_with_config(
    path: impl AsRef<Path>,
    config: IndexConfig,
) -> Result<BoundarySet, DatasetError> {
    BoundarySetBuilder::new(config).load(path).map(|(set, _)| set)
}
