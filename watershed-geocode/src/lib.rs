//! # Watershed Geocode
//!
//! Turns free-form address text into a validated coordinate.
//!
//! ## Architecture
//!
//! - **Providers**: adapters implementing [`GeocodeProvider`] (Google,
//!   geocode.maps.co, Nominatim), each normalizing its response into a
//!   [`GeocodeCandidate`] with a categorical [`Confidence`]
//! - **Resolver**: [`GeocodeResolver`] tries providers in priority order with
//!   a per-call timeout; provider failures never reach the caller
//! - **Validator**: [`AddressValidator`] accepts or rejects the candidate and
//!   gathers ranked suggestions on rejection

pub mod address;
pub mod candidate;
pub mod config;
pub mod error;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod validator;

pub use address::{normalize, similarity, AddressInput};
pub use candidate::{Confidence, GeocodeCandidate};
pub use config::{GeocodeConfig, ValidatorConfig};
pub use error::{GeocodeError, ProviderError, Result};
pub use provider::{GeocodeProvider, ProviderKind, RawProviderResponse};
pub use resolver::GeocodeResolver;
pub use validator::{
    AcceptedAddress, AddressValidator, RejectReason, Suggestion, ValidationFailure,
    ValidationOutcome,
};
