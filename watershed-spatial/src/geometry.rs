//! Geometry parsing and precomputed metadata.
//!
//! This module provides:
//! - GeoJSON (`Polygon` / `MultiPolygon`) and WKT parsing into geo-types
//! - WGS84 bounds checking (rejects projected coordinates)
//! - Precomputed metadata (bbox, geodesic area) used by the envelope index
//!
//! Every stored geometry is normalized to a `MultiPolygon<f64>` so the exact
//! containment test has a single code path.

use geo::{BoundingRect, GeodesicArea};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Geometry type discriminator for the types the dataset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Polygon,
    MultiPolygon,
}

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
            && self.min_lng <= other.max_lng
            && self.max_lng >= other.min_lng
    }

    /// Check if this bbox contains a point (edges inclusive).
    pub fn contains_point(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }

    /// Smallest bbox covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min_lat: self.min_lat.min(other.min_lat),
            max_lat: self.max_lat.max(other.max_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    /// Compute from a multipolygon. `None` for an empty geometry.
    pub fn from_geometry(geom: &MultiPolygon<f64>) -> Option<Self> {
        let rect = geom.bounding_rect()?;
        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }
}

/// Precomputed geometry metadata, stored alongside each record's envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryMetadata {
    /// Geometry type as found in the dataset (before normalization).
    pub geom_type: GeometryType,

    /// Bounding box.
    pub bbox: BBox,

    /// Geodesic area in square kilometres.
    pub area_sqkm: f64,

    /// Total number of ring positions (for load statistics).
    pub vertex_count: usize,
}

impl GeometryMetadata {
    /// Compute metadata for a normalized multipolygon.
    ///
    /// Returns `None` for an empty geometry (no bbox).
    pub fn compute(geom: &MultiPolygon<f64>, geom_type: GeometryType) -> Option<Self> {
        let bbox = BBox::from_geometry(geom)?;
        let vertex_count = geom
            .0
            .iter()
            .map(|p| {
                p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            })
            .sum();
        Some(Self {
            geom_type,
            bbox,
            area_sqkm: geodesic_area_sqkm(geom),
            vertex_count,
        })
    }
}

/// Geodesic (WGS84 ellipsoid) area in square kilometres.
pub fn geodesic_area_sqkm(geom: &MultiPolygon<f64>) -> f64 {
    geom.geodesic_area_unsigned() / 1_000_000.0
}

/// First coordinate outside WGS84 degree bounds, if any.
///
/// Projected datasets (e.g. BC Albers metres) show up here as coordinates in
/// the hundreds of thousands.
pub fn first_out_of_system(geom: &MultiPolygon<f64>) -> Option<Coord<f64>> {
    geom.0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
        .flat_map(|ring| ring.0.iter())
        .find(|c| {
            !c.x.is_finite()
                || !c.y.is_finite()
                || !(-180.0..=180.0).contains(&c.x)
                || !(-90.0..=90.0).contains(&c.y)
        })
        .copied()
}

// ============================================================================
// GeoJSON
// ============================================================================

/// GeoJSON geometry object, restricted to the polygonal types.
///
/// Positions are `[lon, lat]` with an optional ignored elevation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl GeoJsonGeometry {
    /// Convert to a normalized multipolygon.
    pub fn to_multipolygon(&self) -> Result<(MultiPolygon<f64>, GeometryType), String> {
        match self {
            GeoJsonGeometry::Polygon { coordinates } => {
                let polygon = polygon_from_rings(coordinates)?;
                Ok((MultiPolygon(vec![polygon]), GeometryType::Polygon))
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                let polygons = coordinates
                    .iter()
                    .map(|rings| polygon_from_rings(rings))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((MultiPolygon(polygons), GeometryType::MultiPolygon))
            }
            GeoJsonGeometry::Unsupported => {
                Err("geometry must be a Polygon or MultiPolygon".to_string())
            }
        }
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, String> {
    let mut rings = rings.iter().map(|r| ring_from_positions(r));
    let exterior = rings
        .next()
        .ok_or_else(|| "polygon has no exterior ring".to_string())??;
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    // A closed ring needs at least 4 positions; geo-types closes open rings,
    // so 3 distinct positions are the minimum we accept.
    if positions.len() < 3 {
        return Err(format!(
            "ring has {} positions; at least 3 required",
            positions.len()
        ));
    }
    let coords = positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err("position must have at least 2 components".to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

// ============================================================================
// WKT
// ============================================================================

/// Parse WKT string to geo-types Geometry.
pub fn parse_wkt(wkt: &str) -> Result<Geometry<f64>, String> {
    use std::str::FromStr;
    wkt::Wkt::from_str(wkt)
        .map_err(|e| format!("WKT parse error: {e:?}"))
        .and_then(|w| {
            w.try_into()
                .map_err(|e: wkt::conversion::Error| format!("WKT conversion error: {e:?}"))
        })
}

/// Parse WKT and normalize to a multipolygon.
pub fn multipolygon_from_wkt(wkt: &str) -> Result<(MultiPolygon<f64>, GeometryType), String> {
    match parse_wkt(wkt)? {
        Geometry::Polygon(p) => Ok((MultiPolygon(vec![p]), GeometryType::Polygon)),
        Geometry::MultiPolygon(mp) => Ok((mp, GeometryType::MultiPolygon)),
        Geometry::Rect(r) => Ok((MultiPolygon(vec![r.to_polygon()]), GeometryType::Polygon)),
        _ => Err("geometry must be a Polygon or MultiPolygon".to_string()),
    }
}
