//! Resolution orchestrator.
//!
//! `address → Resolver → Validator → (accept) Containment → Hierarchy`, or
//! `(reject) → suggestions` without touching the containment index.
//!
//! The orchestrator holds no mutable state. The containment index is
//! injected and only read, so one instance serves concurrent requests.

use crate::error::{LookupError, Result};
use crate::hierarchy::HierarchyDeriver;
use crate::result::{LookupOutcome, NotFoundError, WatershedMatch, WatershedResult, WatershedSummary};
use tracing::{error, info, instrument};
use watershed_core::Coordinate;
use watershed_geocode::{
    AddressInput, AddressValidator, GeocodeResolver, ValidationOutcome,
};
use watershed_spatial::ContainmentQuery;

/// Address-to-watershed lookup over an injected containment index.
#[derive(Debug)]
pub struct WatershedLookup<Q> {
    query: Q,
    resolver: GeocodeResolver,
    validator: AddressValidator,
}

impl<Q: ContainmentQuery> WatershedLookup<Q> {
    pub fn new(query: Q, resolver: GeocodeResolver, validator: AddressValidator) -> Self {
        Self {
            query,
            resolver,
            validator,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn resolver(&self) -> &GeocodeResolver {
        &self.resolver
    }

    /// Resolve an address to its watershed and lineage.
    #[instrument(level = "info", skip_all, fields(address = %address))]
    pub async fn lookup(&self, address: &str) -> Result<LookupOutcome> {
        let input = AddressInput::parse(address).ok_or(LookupError::EmptyAddress)?;

        let accepted = match self.validate_input(&input).await? {
            ValidationOutcome::Accepted(accepted) => accepted,
            ValidationOutcome::Rejected(failure) => return Ok(LookupOutcome::Rejected(failure)),
        };

        match self.locate(accepted.coordinate)? {
            Some(m) => {
                info!(
                    watershed = %m.watershed.id,
                    country = %m.watershed.country,
                    lat = accepted.coordinate.latitude,
                    lon = accepted.coordinate.longitude,
                    "watershed found"
                );
                Ok(LookupOutcome::Found(WatershedResult::new(
                    input.as_str(),
                    accepted,
                    m,
                )))
            }
            None => {
                info!(
                    lat = accepted.coordinate.latitude,
                    lon = accepted.coordinate.longitude,
                    "coordinate outside coverage"
                );
                Ok(LookupOutcome::NotFound(NotFoundError {
                    coordinate: accepted.coordinate,
                    formatted_address: Some(accepted.formatted_address),
                }))
            }
        }
    }

    /// Geocode and validate without containment.
    pub async fn validate(&self, address: &str) -> Result<ValidationOutcome> {
        let input = AddressInput::parse(address).ok_or(LookupError::EmptyAddress)?;
        self.validate_input(&input).await
    }

    async fn validate_input(&self, input: &AddressInput) -> Result<ValidationOutcome> {
        let candidate = self.resolver.resolve(input.as_str()).await?;
        Ok(self.validator.validate(&self.resolver, input, candidate).await)
    }

    /// Containment plus hierarchy for a known coordinate.
    ///
    /// `Ok(None)` means the point is outside every polygon.
    pub fn locate(&self, coordinate: Coordinate) -> Result<Option<WatershedMatch>> {
        let record = self.query.locate(coordinate).map_err(|e| {
            error!(
                lat = coordinate.latitude,
                lon = coordinate.longitude,
                error = %e,
                "containment query failed"
            );
            LookupError::Internal(e.to_string())
        })?;

        Ok(record.map(|record| WatershedMatch {
            coordinate,
            watershed: WatershedSummary::from(record),
            hierarchy: HierarchyDeriver::new(self.query.names()).derive(record),
        }))
    }
}
