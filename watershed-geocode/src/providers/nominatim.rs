//! Nominatim-compatible search adapter.
//!
//! Serves both geocode.maps.co (optional API key) and OpenStreetMap
//! Nominatim (free fallback). Neither reports a confidence signal, so
//! candidates carry `confidence: None` and acceptance falls back to string
//! comparison.

use crate::candidate::GeocodeCandidate;
use crate::error::ProviderError;
use crate::provider::{
    read_json, usable_candidates, GeocodeProvider, ProviderKind, RawProviderResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

pub struct NominatimProvider {
    kind: ProviderKind,
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl NominatimProvider {
    pub fn new(kind: ProviderKind, client: Client, base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            kind,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout_ms,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

impl fmt::Debug for NominatimProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NominatimProvider")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn fetch(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<RawProviderResponse, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let limit = limit.max(1).to_string();
        let mut params = vec![("q", address), ("format", "json"), ("limit", limit.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.as_str()));
        }
        let request = self.client.get(&url).query(&params);
        read_json(self.kind, request, self.timeout_ms).await
    }

    fn parse(&self, raw: &RawProviderResponse) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        let places: Vec<Place> = serde_json::from_value(raw.body.clone())
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        usable_candidates(
            self.kind,
            places.into_iter().map(|p| {
                match (p.lat.trim().parse::<f64>(), p.lon.trim().parse::<f64>()) {
                    (Ok(lat), Ok(lon)) => {
                        GeocodeCandidate::checked(lat, lon, p.display_name, self.name(), None)
                    }
                    _ => Err(ProviderError::Malformed(format!(
                        "non-numeric coordinate ({}, {})",
                        p.lat, p.lon
                    ))),
                }
            }),
        )
    }
}
