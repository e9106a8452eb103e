//! Geocoder and validator configuration.

use crate::candidate::Confidence;
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_MAPS_CO_BASE_URL: &str = "https://geocode.maps.co";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Configuration for the provider chain.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    /// Provider priority order. Providers whose credentials are missing are
    /// dropped from the chain.
    /// Default: google, maps_co, nominatim
    pub providers: Vec<ProviderKind>,

    /// Google Geocoding API key. Google is skipped when absent.
    pub google_api_key: Option<String>,

    /// geocode.maps.co API key (optional).
    pub maps_co_api_key: Option<String>,

    /// Per-call timeout in milliseconds.
    /// Default: 10000
    pub timeout_ms: u64,

    /// User-Agent sent to every provider (Nominatim requires one).
    pub user_agent: String,

    pub google_base_url: String,
    pub maps_co_base_url: String,
    pub nominatim_base_url: String,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            providers: ProviderKind::DEFAULT_ORDER.to_vec(),
            google_api_key: None,
            maps_co_api_key: None,
            timeout_ms: 10_000,
            user_agent: format!("watershed-lookup/{}", env!("CARGO_PKG_VERSION")),
            google_base_url: DEFAULT_GOOGLE_BASE_URL.to_string(),
            maps_co_base_url: DEFAULT_MAPS_CO_BASE_URL.to_string(),
            nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_string(),
        }
    }
}

impl GeocodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers(mut self, providers: Vec<ProviderKind>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_google_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    pub fn with_maps_co_api_key(mut self, key: impl Into<String>) -> Self {
        self.maps_co_api_key = Some(key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.max(1);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override a provider's base URL (used to point adapters at a mock server).
    pub fn with_base_url(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        match kind {
            ProviderKind::Google => self.google_base_url = url,
            ProviderKind::MapsCo => self.maps_co_base_url = url,
            ProviderKind::Nominatim => self.nominatim_base_url = url,
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for GeocodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodeConfig")
            .field("providers", &self.providers)
            .field("has_google_api_key", &self.google_api_key.is_some())
            .field("has_maps_co_api_key", &self.maps_co_api_key.is_some())
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Acceptance and suggestion settings for the address validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum provider confidence for automatic acceptance.
    /// Default: medium
    pub confidence_threshold: Confidence,

    /// Minimum token similarity when the provider gives no confidence.
    /// Default: 0.8
    pub similarity_threshold: f64,

    /// Maximum suggestions returned on rejection.
    /// Default: 5
    pub max_suggestions: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: Confidence::Medium,
            similarity_threshold: 0.8,
            max_suggestions: 5,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence_threshold(mut self, threshold: Confidence) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }
}
