//! # Watershed Lookup
//!
//! Composes geocoding, validation, spatial containment and hierarchy
//! derivation into one operation: free-form address in, watershed and full
//! lineage out.
//!
//! ```ignore
//! let boundaries = watershed_spatial::load("data/cascadia_watersheds.geojson")?;
//! let resolver = GeocodeResolver::from_config(&GeocodeConfig::default())?;
//! let lookup = WatershedLookup::new(boundaries, resolver, AddressValidator::default());
//!
//! match lookup.lookup("1620 Belmont Ave, Victoria, BC").await? {
//!     LookupOutcome::Found(result) => println!("{}", result.watershed.name),
//!     LookupOutcome::Rejected(failure) => println!("{} suggestions", failure.suggestions.len()),
//!     LookupOutcome::NotFound(nf) => println!("{nf}"),
//! }
//! ```

pub mod cache;
pub mod error;
pub mod hierarchy;
pub mod lookup;
pub mod result;

pub use cache::{CacheConfig, CacheStats, CachedLookup};
pub use error::{LookupError, Result};
pub use hierarchy::{HierarchyDeriver, HierarchyLevel, HierarchyResult};
pub use lookup::WatershedLookup;
pub use result::{LookupOutcome, NotFoundError, WatershedMatch, WatershedResult, WatershedSummary};

pub use watershed_geocode::{Suggestion, ValidationFailure, ValidationOutcome};
