//! The immutable in-memory watershed collection and its containment query.
//!
//! A `BoundarySet` is built once by the loader and never mutated. Queries
//! take `&self`, so any number of threads may read it concurrently.
//!
//! Query pipeline:
//! 1. Extent short-circuit: a point outside the union of all envelopes is a miss
//! 2. R-tree envelope search
//! 3. Exact boundary-inclusive point-in-polygon test per candidate
//! 4. Seam resolution: smallest `area_sqkm` wins, ties broken by `unique_id`

use crate::error::{Result, SpatialError};
use crate::geometry::{BBox, GeometryMetadata};
use crate::index::{EnvelopeIndex, IndexedEnvelope};
use geo::Intersects;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, warn};
use watershed_core::{Coordinate, Country, DataSource, NameTable, WatershedRecord};

/// Counters for a single containment query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Query point was outside the overall extent; nothing else ran.
    pub short_circuited: bool,

    /// Number of envelopes returned by the R-tree search.
    pub candidates: usize,

    /// Number of exact point-in-polygon tests performed.
    pub exact_checks: usize,

    /// Number of polygons that contain the point.
    pub hits: usize,
}

impl QueryStats {
    /// Fraction of envelope candidates that were true hits.
    ///
    /// Higher is better (the envelope search was tight).
    pub fn precision(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.hits as f64 / self.candidates as f64
        }
    }

    /// True when the point sat on a harmonization seam.
    pub fn is_overlap(&self) -> bool {
        self.hits > 1
    }
}

/// Dataset-level summary, reported by the `stats` command.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub version: Option<String>,
    pub records: usize,
    pub us_records: usize,
    pub ca_records: usize,
    pub by_source: Vec<(DataSource, usize)>,
    pub named_codes: usize,
    pub extent: BBox,
    pub total_area_sqkm: f64,
}

/// Full watershed collection plus its envelope index.
#[derive(Debug)]
pub struct BoundarySet {
    records: Vec<WatershedRecord>,
    metadata: Vec<GeometryMetadata>,
    index: EnvelopeIndex,
    by_id: FxHashMap<String, usize>,
    names: NameTable,
    extent: BBox,
    version: Option<String>,
}

impl BoundarySet {
    /// Assemble from already-validated parts.
    ///
    /// `records` and `metadata` are parallel; `records` must be non-empty and
    /// ids unique (the loader guarantees both).
    pub(crate) fn from_parts(
        records: Vec<WatershedRecord>,
        metadata: Vec<GeometryMetadata>,
        names: NameTable,
        version: Option<String>,
    ) -> Self {
        let envelopes = metadata
            .iter()
            .enumerate()
            .map(|(slot, m)| IndexedEnvelope::new(slot, &m.bbox))
            .collect();
        let extent = metadata
            .iter()
            .map(|m| m.bbox)
            .reduce(|a, b| a.union(&b))
            .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        let by_id = records
            .iter()
            .enumerate()
            .map(|(slot, r)| (r.unique_id().to_string(), slot))
            .collect();

        Self {
            records,
            metadata,
            index: EnvelopeIndex::bulk_load(envelopes),
            by_id,
            names,
            extent,
            version,
        }
    }

    /// The containing watershed for a coordinate, or `None` when the point
    /// lies outside every polygon.
    pub fn containing(&self, coordinate: Coordinate) -> Result<Option<&WatershedRecord>> {
        self.containing_with_stats(coordinate).map(|(r, _)| r)
    }

    /// Like [`containing`](Self::containing), also returning query counters.
    pub fn containing_with_stats(
        &self,
        coordinate: Coordinate,
    ) -> Result<(Option<&WatershedRecord>, QueryStats)> {
        let (hits, stats) = self.hits(coordinate)?;

        let chosen = hits.iter().copied().min_by(|a, b| seam_order(a, b));
        if stats.is_overlap() {
            if let Some(winner) = chosen {
                warn!(
                    lat = coordinate.latitude,
                    lon = coordinate.longitude,
                    hits = stats.hits,
                    chosen = winner.unique_id(),
                    "point falls in overlapping watersheds; smallest area wins"
                );
            }
        }
        debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            candidates = stats.candidates,
            exact_checks = stats.exact_checks,
            hits = stats.hits,
            "containment query"
        );
        Ok((chosen, stats))
    }

    /// Every watershed containing the coordinate, smallest first.
    ///
    /// Used for seam diagnostics; normal lookups use [`containing`](Self::containing).
    pub fn containing_all(&self, coordinate: Coordinate) -> Result<Vec<&WatershedRecord>> {
        let (mut hits, _) = self.hits(coordinate)?;
        hits.sort_by(|a, b| seam_order(a, b));
        Ok(hits)
    }

    fn hits(&self, coordinate: Coordinate) -> Result<(Vec<&WatershedRecord>, QueryStats)> {
        if !coordinate.is_valid() {
            return Err(SpatialError::InvalidCoordinate(coordinate));
        }
        let mut stats = QueryStats::default();
        let (lat, lon) = (coordinate.latitude, coordinate.longitude);

        if !self.extent.contains_point(lat, lon) {
            stats.short_circuited = true;
            return Ok((Vec::new(), stats));
        }

        let point = coordinate.to_point();
        let candidates = self.index.candidates_at(lon, lat);
        stats.candidates = candidates.len();

        let mut hits = Vec::new();
        for slot in candidates {
            let record = self.records.get(slot).ok_or_else(|| {
                SpatialError::Internal(format!(
                    "index slot {slot} out of range ({} records)",
                    self.records.len()
                ))
            })?;
            stats.exact_checks += 1;
            if record.geometry().intersects(&point) {
                hits.push(record);
            }
        }
        stats.hits = hits.len();
        Ok((hits, stats))
    }

    /// Look up a record by `unique_id`.
    pub fn get(&self, unique_id: &str) -> Option<&WatershedRecord> {
        self.by_id.get(unique_id).and_then(|&slot| self.records.get(slot))
    }

    /// Follow `downstream_id` links starting at `unique_id`.
    ///
    /// Stops at the first record without a known downstream neighbour. Cycles
    /// in the dataset terminate the walk at the first repeated id.
    pub fn downstream_path(&self, unique_id: &str) -> Vec<&WatershedRecord> {
        let mut path = Vec::new();
        let mut seen = rustc_hash::FxHashSet::default();
        let mut current = self.get(unique_id);
        while let Some(record) = current {
            if !seen.insert(record.unique_id()) {
                break;
            }
            path.push(record);
            current = record.downstream_id().and_then(|id| self.get(id));
        }
        path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatershedRecord> {
        self.records.iter()
    }

    /// Precomputed geometry metadata for a record.
    pub fn metadata(&self, unique_id: &str) -> Option<&GeometryMetadata> {
        self.by_id.get(unique_id).and_then(|&slot| self.metadata.get(slot))
    }

    /// The secondary name-by-code table shipped with the dataset.
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Union of all record envelopes.
    pub fn extent(&self) -> BBox {
        self.extent
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn summary(&self) -> DatasetSummary {
        let mut by_source: Vec<(DataSource, usize)> = Vec::new();
        for record in &self.records {
            let source = record.data_source();
            match by_source.iter_mut().find(|(s, _)| *s == source) {
                Some((_, n)) => *n += 1,
                None => by_source.push((source, 1)),
            }
        }
        by_source.sort_by_key(|(s, _)| s.as_str());
        let us_records = self
            .records
            .iter()
            .filter(|r| r.country() == Country::Us)
            .count();

        DatasetSummary {
            version: self.version.clone(),
            records: self.records.len(),
            us_records,
            ca_records: self.records.len() - us_records,
            by_source,
            named_codes: self.names.len(),
            extent: self.extent,
            total_area_sqkm: self.records.iter().map(|r| r.area_sqkm()).sum(),
        }
    }
}

/// Smallest area first, then `unique_id` for a total order.
fn seam_order(a: &WatershedRecord, b: &WatershedRecord) -> Ordering {
    a.area_sqkm()
        .total_cmp(&b.area_sqkm())
        .then_with(|| a.unique_id().cmp(b.unique_id()))
}
