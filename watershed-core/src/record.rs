//! Harmonized watershed records.

use crate::code::HydroCode;
use crate::country::{Country, DataSource};
use crate::error::{CodeError, Result};
use geo_types::MultiPolygon;

/// One polygon of the harmonized cross-border dataset.
///
/// Records are immutable once built. `unique_id` is globally unique across
/// both national systems and is never reused between dataset versions.
#[derive(Debug, Clone)]
pub struct WatershedRecord {
    unique_id: String,
    name: String,
    code: HydroCode,
    area_sqkm: f64,
    downstream_id: Option<String>,
    geometry: MultiPolygon<f64>,
}

impl WatershedRecord {
    /// Build a record, enforcing the record-level invariants.
    ///
    /// `country` and `data_source` are the tags found in the dataset; they
    /// must agree with the scheme of `code`.
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        country: Country,
        data_source: Option<DataSource>,
        code: HydroCode,
        area_sqkm: f64,
        geometry: MultiPolygon<f64>,
    ) -> Result<Self> {
        let unique_id = unique_id.into();
        if unique_id.trim().is_empty() {
            return Err(CodeError::InvalidRecord("empty unique_id".into()));
        }
        if code.country() != country {
            return Err(CodeError::CountryMismatch {
                country: country.as_str(),
                scheme: code.scheme(),
            });
        }
        if let Some(source) = data_source {
            if source != code.data_source() {
                return Err(CodeError::InvalidRecord(format!(
                    "{unique_id}: data source {source} does not match {} code",
                    code.scheme()
                )));
            }
        }
        if !area_sqkm.is_finite() || area_sqkm < 0.0 {
            return Err(CodeError::InvalidRecord(format!(
                "{unique_id}: area_sqkm must be >= 0, got {area_sqkm}"
            )));
        }
        Ok(Self {
            unique_id,
            name: name.into(),
            code,
            area_sqkm,
            downstream_id: None,
            geometry,
        })
    }

    /// Attach the cross-border downstream link.
    pub fn with_downstream_id(mut self, downstream_id: Option<String>) -> Self {
        self.downstream_id = downstream_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> Country {
        self.code.country()
    }

    pub fn data_source(&self) -> DataSource {
        self.code.data_source()
    }

    pub fn code(&self) -> &HydroCode {
        &self.code
    }

    pub fn area_sqkm(&self) -> f64 {
        self.area_sqkm
    }

    /// `unique_id` of the watershed this one drains into, if known.
    pub fn downstream_id(&self) -> Option<&str> {
        self.downstream_id.as_deref()
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }
}
