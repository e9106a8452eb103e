//! Google Geocoding API adapter.
//!
//! `GET {base}/maps/api/geocode/json?address=...&key=...`. Confidence comes
//! from `geometry.location_type`; a `partial_match` result is one step less
//! trusted.

use crate::candidate::{Confidence, GeocodeCandidate};
use crate::error::ProviderError;
use crate::provider::{
    read_json, usable_candidates, GeocodeProvider, ProviderKind, RawProviderResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

pub struct GoogleProvider {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_ms: u64,
}

impl GoogleProvider {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_ms,
        }
    }
}

impl fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("base_url", &self.base_url)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GoogleResult>,
}

#[derive(Debug, Deserialize)]
struct GoogleResult {
    formatted_address: String,
    geometry: GoogleGeometry,
    #[serde(default)]
    partial_match: bool,
}

#[derive(Debug, Deserialize)]
struct GoogleGeometry {
    location: GoogleLocation,
    #[serde(default)]
    location_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

fn location_confidence(location_type: Option<&str>) -> Option<Confidence> {
    match location_type? {
        "ROOFTOP" => Some(Confidence::High),
        "RANGE_INTERPOLATED" => Some(Confidence::Medium),
        "GEOMETRIC_CENTER" | "APPROXIMATE" => Some(Confidence::Low),
        _ => None,
    }
}

#[async_trait]
impl GeocodeProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn fetch(
        &self,
        address: &str,
        _limit: usize,
    ) -> Result<RawProviderResponse, ProviderError> {
        // Google has no result-count parameter; `parse` returns all results.
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())]);
        read_json(self.kind(), request, self.timeout_ms).await
    }

    fn parse(&self, raw: &RawProviderResponse) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        let response: GoogleResponse = serde_json::from_value(raw.body.clone())
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        match response.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                return Err(ProviderError::RateLimited(response.status));
            }
            _ => {
                return Err(ProviderError::Rejected {
                    status: response.status,
                    message: response.error_message.unwrap_or_default(),
                });
            }
        }

        usable_candidates(
            self.kind(),
            response.results.into_iter().map(|r| {
                let mut confidence = location_confidence(r.geometry.location_type.as_deref());
                if r.partial_match {
                    confidence = confidence.map(Confidence::step_down);
                }
                GeocodeCandidate::checked(
                    r.geometry.location.lat,
                    r.geometry.location.lng,
                    r.formatted_address,
                    self.name(),
                    confidence,
                )
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base: &str) -> GoogleProvider {
        GoogleProvider::new(Client::new(), base, "test-key", 1_000)
    }

    fn raw(body: serde_json::Value) -> RawProviderResponse {
        RawProviderResponse {
            provider: ProviderKind::Google,
            body,
        }
    }

    #[test]
    fn test_location_type_mapping() {
        let p = provider("http://unused");
        let body = json!({
            "status": "OK",
            "results": [
                {"formatted_address": "a", "geometry": {"location": {"lat": 1.0, "lng": 2.0}, "location_type": "ROOFTOP"}},
                {"formatted_address": "b", "geometry": {"location": {"lat": 1.0, "lng": 2.0}, "location_type": "ROOFTOP"}, "partial_match": true},
                {"formatted_address": "c", "geometry": {"location": {"lat": 1.0, "lng": 2.0}, "location_type": "APPROXIMATE"}},
                {"formatted_address": "d", "geometry": {"location": {"lat": 1.0, "lng": 2.0}}}
            ]
        });
        let candidates = p.parse(&raw(body)).unwrap();
        let confidences: Vec<_> = candidates.iter().map(|c| c.confidence).collect();
        assert_eq!(
            confidences,
            vec![
                Some(Confidence::High),
                Some(Confidence::Medium),
                Some(Confidence::Low),
                None
            ]
        );
        assert_eq!(candidates[0].provider_name, "google");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let p = provider("http://unused");
        let candidates = p
            .parse(&raw(json!({"status": "ZERO_RESULTS", "results": []})))
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_denied_is_an_error() {
        let p = provider("http://unused");
        let err = p
            .parse(&raw(json!({"status": "REQUEST_DENIED", "error_message": "bad key"})))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { .. }));
        assert!(err.to_string().contains("bad key"));

        let err = p
            .parse(&raw(json!({"status": "OVER_QUERY_LIMIT"})))
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[test]
    fn test_out_of_range_location_is_malformed() {
        let p = provider("http://unused");
        let err = p
            .parse(&raw(json!({
                "status": "OK",
                "results": [{"formatted_address": "a", "geometry": {"location": {"lat": 148.43, "lng": -123.3389}, "location_type": "ROOFTOP"}}]
            })))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug_output = format!("{:?}", provider("http://unused"));
        assert!(debug_output.contains("has_api_key: true"));
        assert!(!debug_output.contains("test-key"));
    }

    #[tokio::test]
    async fn test_geocode_sends_address_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "1620 Belmont Ave, Victoria, BC"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [{
                    "formatted_address": "1620 Belmont Ave, Victoria, BC V8R 3Z3, Canada",
                    "geometry": {"location": {"lat": 48.428, "lng": -123.3389}, "location_type": "ROOFTOP"}
                }]
            })))
            .mount(&server)
            .await;

        let candidate = provider(&server.uri())
            .geocode("1620 Belmont Ave, Victoria, BC")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(candidate.confidence, Some(Confidence::High));
        assert!((candidate.latitude - 48.428).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_http_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        let err = provider(&server.uri()).geocode("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let err = provider(&server.uri()).geocode("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Outage(503)));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        let err = provider(&server.uri()).geocode("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
