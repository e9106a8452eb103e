//! On-disk dataset schema and per-feature decoding.
//!
//! The dataset is a GeoJSON `FeatureCollection` with two foreign members
//! (`version`, `names`). Property names accept both the harmonized lowercase
//! spelling and the legacy column spellings of the export pipeline.

use crate::config::IndexConfig;
use crate::error::DatasetError;
use crate::geometry::{
    first_out_of_system, geodesic_area_sqkm, multipolygon_from_wkt, GeoJsonGeometry,
    GeometryMetadata, GeometryType,
};
use geo_types::MultiPolygon;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use watershed_core::{
    CaCode, Country, DataSource, FwaCode, HucCode, HydroCode, SdacCode, WatershedRecord,
};

#[derive(Debug, Deserialize)]
pub(crate) struct RawCollection {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFeature {
    #[serde(default)]
    pub geometry: Option<RawGeometry>,
    #[serde(default)]
    pub properties: RawProperties,
}

/// Geometry as either a GeoJSON object or a WKT string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawGeometry {
    Wkt(String),
    GeoJson(GeoJsonGeometry),
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawProperties {
    #[serde(default, alias = "casc_id", alias = "CASC_ID")]
    pub unique_id: Option<Value>,
    #[serde(default, alias = "Watershed_Name", alias = "name")]
    pub watershed_name: Option<String>,
    #[serde(default, alias = "Country")]
    pub country: Option<String>,
    #[serde(default, alias = "DataSource", alias = "data_source")]
    pub datasource: Option<String>,
    #[serde(default, alias = "Area_SqKm")]
    pub area_sqkm: Option<f64>,
    #[serde(default, alias = "HUC_Code", alias = "huc_code")]
    pub huc12_code: Option<Value>,
    #[serde(default, alias = "FWA_Code")]
    pub fwa_watershed_code: Option<Value>,
    #[serde(default, alias = "sdac_ssda_code", alias = "SDAC_Code")]
    pub sdac_code: Option<Value>,
    #[serde(default, alias = "Downstream_CASC_ID", alias = "downstream_casc_id")]
    pub downstream_id: Option<Value>,
}

/// A decoded feature, ready to be indexed.
pub(crate) struct DecodedFeature {
    pub record: WatershedRecord,
    pub metadata: GeometryMetadata,
    pub area_computed: bool,
}

/// Property values may be strings or bare numbers (HUCs exported as integers).
fn text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn decode_feature(
    index: usize,
    feature: RawFeature,
    config: &IndexConfig,
) -> Result<DecodedFeature, DatasetError> {
    let props = feature.properties;
    let id = text(&props.unique_id)
        .ok_or_else(|| DatasetError::invalid(index, None, "missing unique_id"))?;
    let invalid = |reason: String| DatasetError::invalid(index, Some(&id), reason);

    let (geometry, geom_type) = decode_geometry(feature.geometry).map_err(invalid)?;
    if let Some(c) = first_out_of_system(&geometry) {
        return Err(DatasetError::OutOfSystem {
            index,
            id: id.clone(),
            lon: c.x,
            lat: c.y,
        });
    }
    let metadata = GeometryMetadata::compute(&geometry, geom_type)
        .ok_or_else(|| invalid("empty geometry".to_string()))?;

    let code = decode_code(&props).map_err(invalid)?;

    let country = match props.country.as_deref() {
        Some(raw) => Country::from_str(raw).map_err(|e| invalid(e.to_string()))?,
        None => code.country(),
    };
    let data_source = props
        .datasource
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(DataSource::from_str)
        .transpose()
        .map_err(|e| invalid(e.to_string()))?;

    let (area_sqkm, area_computed) = match props.area_sqkm {
        Some(area) => (area, false),
        None if config.compute_missing_area => (geodesic_area_sqkm(&geometry), true),
        None => return Err(invalid("missing area_sqkm".to_string())),
    };

    let record = WatershedRecord::new(
        id.clone(),
        props.watershed_name.unwrap_or_default(),
        country,
        data_source,
        code,
        area_sqkm,
        geometry,
    )
    .map_err(|e| invalid(e.to_string()))?
    .with_downstream_id(text(&props.downstream_id));

    Ok(DecodedFeature {
        record,
        metadata,
        area_computed,
    })
}

fn decode_geometry(
    geometry: Option<RawGeometry>,
) -> Result<(MultiPolygon<f64>, GeometryType), String> {
    match geometry {
        None => Err("missing geometry".to_string()),
        Some(RawGeometry::Wkt(wkt)) => multipolygon_from_wkt(&wkt),
        Some(RawGeometry::GeoJson(geojson)) => geojson.to_multipolygon(),
    }
}

/// Exactly one code bundle must be populated.
fn decode_code(props: &RawProperties) -> Result<HydroCode, String> {
    let huc = text(&props.huc12_code);
    let fwa = text(&props.fwa_watershed_code);
    let sdac = text(&props.sdac_code);

    match (huc, fwa, sdac) {
        (Some(huc), None, None) => HucCode::parse(&huc)
            .map(HydroCode::Us)
            .map_err(|e| e.to_string()),
        (None, Some(fwa), None) => FwaCode::parse(&fwa)
            .map(|c| HydroCode::Ca(CaCode::Fwa(c)))
            .map_err(|e| e.to_string()),
        (None, None, Some(sdac)) => SdacCode::parse(&sdac)
            .map(|c| HydroCode::Ca(CaCode::Sdac(c)))
            .map_err(|e| e.to_string()),
        (None, None, None) => {
            Err("no code bundle (huc12_code, fwa_watershed_code or sdac_code)".to_string())
        }
        _ => Err("more than one code bundle populated".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(props: Value) -> RawFeature {
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": "POLYGON((-123.4 48.4, -123.3 48.4, -123.3 48.5, -123.4 48.5, -123.4 48.4))",
            "properties": props,
        }))
        .unwrap()
    }

    #[test]
    fn decodes_legacy_column_names() {
        let f = feature(json!({
            "CASC_ID": "CASC-CA-000123",
            "Watershed_Name": "Victoria Harbour",
            "Country": "CAN",
            "DataSource": "BC-FWA",
            "FWA_Code": "920-000000-000000-000000-000000-000000-0001",
        }));
        let decoded = decode_feature(0, f, &IndexConfig::default()).unwrap();
        assert_eq!(decoded.record.unique_id(), "CASC-CA-000123");
        assert_eq!(decoded.record.country(), Country::Ca);
        assert!(decoded.area_computed);
        assert!(decoded.record.area_sqkm() > 0.0);
    }

    #[test]
    fn numeric_huc_is_accepted() {
        let f = feature(json!({
            "unique_id": "US-1",
            "country": "US",
            "huc12_code": 171100190401u64,
            "area_sqkm": 12.5,
        }));
        let decoded = decode_feature(0, f, &IndexConfig::default()).unwrap();
        assert_eq!(decoded.record.code().as_str(), "171100190401");
        assert!(!decoded.area_computed);
    }

    #[test]
    fn two_code_bundles_rejected() {
        let f = feature(json!({
            "unique_id": "X",
            "huc12_code": "171100190401",
            "sdac_code": "08GA",
        }));
        let err = decode_feature(3, f, &IndexConfig::default()).err().unwrap();
        assert!(matches!(err, DatasetError::InvalidFeature { index: 3, .. }));
    }

    #[test]
    fn country_scheme_mismatch_rejected() {
        let f = feature(json!({
            "unique_id": "X",
            "country": "US",
            "sdac_code": "08GA",
        }));
        assert!(decode_feature(0, f, &IndexConfig::default()).is_err());
    }

    #[test]
    fn missing_area_rejected_when_not_computed() {
        let f = feature(json!({"unique_id": "X", "sdac_code": "08GA"}));
        let config = IndexConfig::default().with_compute_missing_area(false);
        assert!(decode_feature(0, f, &config).is_err());
    }

    #[test]
    fn point_geometry_rejected() {
        let f: RawFeature = serde_json::from_value(json!({
            "geometry": {"type": "Point", "coordinates": [-123.0, 48.0]},
            "properties": {"unique_id": "P", "sdac_code": "08GA"},
        }))
        .unwrap();
        let err = decode_feature(0, f, &IndexConfig::default()).err().unwrap();
        assert!(err.to_string().contains("Polygon"));
    }
}
