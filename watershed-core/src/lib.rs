//! # Watershed Core
//!
//! Shared data model for the cross-border watershed lookup engine.
//!
//! This crate provides:
//! - [`WatershedRecord`]: one harmonized watershed polygon with its native code
//! - [`HydroCode`]: the closed union of US (HUC) and Canadian (FWA / SDAC) code schemes
//! - [`Coordinate`]: a validated WGS84 latitude/longitude pair
//! - [`NameTable`]: the name-by-code table shipped with the dataset
//!
//! Ancestry is never stored on a record. It is derived from the native code
//! by the lookup crate.

pub mod code;
pub mod coordinate;
pub mod country;
pub mod error;
pub mod names;
pub mod record;

pub use code::{
    CaCode, FwaCode, HucCode, HydroCode, SdacCode, FWA_PREFIX_WIDTH, HUC_LEVEL_WIDTHS,
    SDAC_LEVEL_WIDTHS,
};
pub use coordinate::Coordinate;
pub use country::{Country, DataSource};
pub use error::{CodeError, Result};
pub use names::NameTable;
pub use record::WatershedRecord;
