//! HTTP provider adapters.

pub mod google;
pub mod nominatim;

pub use google::GoogleProvider;
pub use nominatim::NominatimProvider;
