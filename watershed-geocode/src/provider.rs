//! Geocoding provider capability trait.
//!
//! Each adapter splits a lookup into two halves: `fetch` performs the
//! third-party call and returns the raw body, `parse` maps that body onto
//! [`GeocodeCandidate`]s. The provided `geocode`/`suggest` methods compose
//! the two.

use crate::candidate::GeocodeCandidate;
use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Closed set of provider adapters, used for configuration and priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
    MapsCo,
    Nominatim,
}

impl ProviderKind {
    /// Default priority: most accurate first, free fallbacks last.
    pub const DEFAULT_ORDER: [ProviderKind; 3] =
        [ProviderKind::Google, ProviderKind::MapsCo, ProviderKind::Nominatim];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::MapsCo => "maps_co",
            ProviderKind::Nominatim => "nominatim",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "google" => Ok(ProviderKind::Google),
            "maps_co" | "mapsco" => Ok(ProviderKind::MapsCo),
            "nominatim" | "osm" => Ok(ProviderKind::Nominatim),
            other => Err(format!("unknown geocoding provider '{other}'")),
        }
    }
}

/// Undecoded provider response body.
#[derive(Debug, Clone)]
pub struct RawProviderResponse {
    pub provider: ProviderKind,
    pub body: serde_json::Value,
}

/// A geocoding backend.
#[async_trait]
pub trait GeocodeProvider: fmt::Debug + Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Name reported on candidates and in logs.
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Whether the provider can return several ranked candidates.
    fn supports_suggest(&self) -> bool {
        true
    }

    /// Perform the third-party call for up to `limit` results.
    async fn fetch(&self, address: &str, limit: usize)
        -> Result<RawProviderResponse, ProviderError>;

    /// Map a raw body onto candidates, best first. An empty list means the
    /// provider definitively found nothing.
    fn parse(&self, raw: &RawProviderResponse) -> Result<Vec<GeocodeCandidate>, ProviderError>;

    /// Best single candidate.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeCandidate>, ProviderError> {
        let raw = self.fetch(address, 1).await?;
        Ok(self.parse(&raw)?.into_iter().next())
    }

    /// Up to `limit` candidates for disambiguation.
    async fn suggest(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        if !self.supports_suggest() {
            return Ok(Vec::new());
        }
        let raw = self.fetch(address, limit).await?;
        let mut candidates = self.parse(&raw)?;
        candidates.truncate(limit);
        Ok(candidates)
    }
}

/// Keep the usable entries of a provider's result list. Unusable entries are
/// logged and dropped; a non-empty list with nothing usable is an error.
pub(crate) fn usable_candidates(
    provider: ProviderKind,
    entries: impl IntoIterator<Item = Result<GeocodeCandidate, ProviderError>>,
) -> Result<Vec<GeocodeCandidate>, ProviderError> {
    let mut usable = Vec::new();
    let mut last_error = None;
    for entry in entries {
        match entry {
            Ok(candidate) => usable.push(candidate),
            Err(e) => {
                debug!(provider = %provider, error = %e, "skipping unusable result");
                last_error = Some(e);
            }
        }
    }
    match last_error {
        Some(e) if usable.is_empty() => Err(e),
        _ => Ok(usable),
    }
}

/// Shared response handling for JSON-over-HTTP adapters.
pub(crate) async fn read_json(
    provider: ProviderKind,
    request: reqwest::RequestBuilder,
    timeout_ms: u64,
) -> Result<RawProviderResponse, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(e, timeout_ms))?;

    let status = response.status();
    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimited(format!("HTTP {status}")));
    }
    if status.is_server_error() {
        return Err(ProviderError::Outage(status.as_u16()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::from_reqwest(e, timeout_ms))?;
    Ok(RawProviderResponse { provider, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trip() {
        for kind in ProviderKind::DEFAULT_ORDER {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!("maps-co".parse::<ProviderKind>().unwrap(), ProviderKind::MapsCo);
        assert!("bing".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn usable_candidates_drops_bad_entries() {
        let good = GeocodeCandidate::new(48.4, -123.3, "a", "test", None);
        let bad = || Err(ProviderError::Malformed("bad".into()));

        let kept = usable_candidates(ProviderKind::Nominatim, vec![bad(), Ok(good.clone())]).unwrap();
        assert_eq!(kept, vec![good]);

        assert!(matches!(
            usable_candidates(ProviderKind::Nominatim, vec![bad(), bad()]),
            Err(ProviderError::Malformed(_))
        ));
        assert!(usable_candidates(ProviderKind::Nominatim, Vec::new()).unwrap().is_empty());
    }
}
