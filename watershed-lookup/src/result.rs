//! Lookup result types.

use crate::hierarchy::HierarchyResult;
use serde::Serialize;
use std::fmt;
use watershed_core::{Coordinate, Country, DataSource, WatershedRecord};
use watershed_geocode::{AcceptedAddress, Confidence, ValidationFailure};

/// The matched record's public attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatershedSummary {
    pub id: String,
    pub name: String,
    pub country: Country,
    pub data_source: DataSource,
    pub area_sqkm: f64,
    pub downstream_id: Option<String>,
}

impl From<&WatershedRecord> for WatershedSummary {
    fn from(record: &WatershedRecord) -> Self {
        Self {
            id: record.unique_id().to_string(),
            name: record.name().to_string(),
            country: record.country(),
            data_source: record.data_source(),
            area_sqkm: record.area_sqkm(),
            downstream_id: record.downstream_id().map(str::to_string),
        }
    }
}

/// Containment + hierarchy for a known coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatershedMatch {
    pub coordinate: Coordinate,
    pub watershed: WatershedSummary,
    pub hierarchy: HierarchyResult,
}

/// Full answer for an address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatershedResult {
    pub input_address: String,
    pub formatted_address: String,
    pub provider: String,
    pub confidence: Option<Confidence>,
    pub coordinate: Coordinate,
    pub watershed: WatershedSummary,
    pub hierarchy: HierarchyResult,
}

impl WatershedResult {
    pub(crate) fn new(input_address: &str, accepted: AcceptedAddress, m: WatershedMatch) -> Self {
        Self {
            input_address: input_address.to_string(),
            formatted_address: accepted.formatted_address,
            provider: accepted.provider,
            confidence: accepted.confidence,
            coordinate: m.coordinate,
            watershed: m.watershed,
            hierarchy: m.hierarchy,
        }
    }
}

/// A validated coordinate that lies outside every watershed polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotFoundError {
    pub coordinate: Coordinate,
    pub formatted_address: Option<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.formatted_address {
            Some(address) => write!(
                f,
                "No watershed found for {address} at {}; it is outside the covered region",
                self.coordinate
            ),
            None => write!(
                f,
                "No watershed found at {}; it is outside the covered region",
                self.coordinate
            ),
        }
    }
}

impl std::error::Error for NotFoundError {}

/// Expected lookup results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(WatershedResult),
    Rejected(ValidationFailure),
    NotFound(NotFoundError),
}

impl LookupOutcome {
    pub fn as_found(&self) -> Option<&WatershedResult> {
        match self {
            LookupOutcome::Found(result) => Some(result),
            _ => None,
        }
    }

    /// Whether this outcome may be memoized.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, LookupOutcome::Rejected(_))
    }
}
