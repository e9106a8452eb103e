//! Priority-ordered geocoding fallback chain.
//!
//! Providers are tried strictly in order. A transient failure or an empty
//! result advances to the next provider; only exhausting the chain yields a
//! [`GeocodeError`]. There is no retry on a single provider.

use crate::candidate::GeocodeCandidate;
use crate::config::GeocodeConfig;
use crate::error::{GeocodeError, ProviderError, Result};
use crate::provider::{GeocodeProvider, ProviderKind};
use crate::providers::{GoogleProvider, NominatimProvider};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Tries multiple geocoding providers in priority order until one succeeds.
#[derive(Debug, Clone)]
pub struct GeocodeResolver {
    providers: Vec<Arc<dyn GeocodeProvider>>,
    timeout: Duration,
}

impl GeocodeResolver {
    /// Build from explicit providers (highest priority first).
    pub fn new(providers: Vec<Arc<dyn GeocodeProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Build the chain described by `config`.
    ///
    /// Providers that need a missing credential are skipped; a provider
    /// listed twice is kept only at its first position.
    pub fn from_config(config: &GeocodeConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut providers: Vec<Arc<dyn GeocodeProvider>> = Vec::new();
        let mut seen = Vec::new();
        for &kind in &config.providers {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);
            match kind {
                ProviderKind::Google => match &config.google_api_key {
                    Some(key) => providers.push(Arc::new(GoogleProvider::new(
                        client.clone(),
                        &config.google_base_url,
                        key,
                        config.timeout_ms,
                    ))),
                    None => {
                        debug!(provider = %kind, "skipping provider: no API key configured");
                    }
                },
                ProviderKind::MapsCo => providers.push(Arc::new(
                    NominatimProvider::new(
                        kind,
                        client.clone(),
                        &config.maps_co_base_url,
                        config.timeout_ms,
                    )
                    .with_api_key(config.maps_co_api_key.clone()),
                )),
                ProviderKind::Nominatim => providers.push(Arc::new(NominatimProvider::new(
                    kind,
                    client.clone(),
                    &config.nominatim_base_url,
                    config.timeout_ms,
                ))),
            }
        }

        info!(
            providers = ?providers.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            timeout_ms = config.timeout_ms,
            "geocoding chain configured"
        );
        Ok(Self::new(providers, config.timeout()))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an address to the first candidate any provider returns.
    #[instrument(level = "debug", skip(self), fields(providers = self.providers.len()))]
    pub async fn resolve(&self, address: &str) -> Result<GeocodeCandidate> {
        if self.providers.is_empty() {
            return Err(GeocodeError::NoProviders);
        }

        let mut errors = Vec::new();
        for provider in &self.providers {
            match self.bounded(provider.geocode(address)).await {
                Ok(Some(candidate)) => {
                    debug!(
                        provider = %provider.name(),
                        confidence = ?candidate.confidence,
                        "provider resolved address"
                    );
                    return Ok(candidate);
                }
                Ok(None) => {
                    debug!(provider = %provider.name(), "provider returned no results, trying next");
                    errors.push(format!("{}: no results", provider.name()));
                }
                Err(e) => {
                    debug!(provider = %provider.name(), error = %e, "provider failed, trying next");
                    errors.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        let details = errors.join("; ");
        warn!(address = %address, details = %details, "all geocoding providers exhausted");
        Err(GeocodeError::Exhausted {
            address: address.to_string(),
            details,
        })
    }

    /// Candidate list from the first suggestion-capable provider that
    /// returns a non-empty list. Failures are logged and skipped; an empty
    /// result is not an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn suggest(&self, address: &str, limit: usize) -> Vec<GeocodeCandidate> {
        if limit == 0 {
            return Vec::new();
        }
        for provider in self.providers.iter().filter(|p| p.supports_suggest()) {
            match self.bounded(provider.suggest(address, limit)).await {
                Ok(candidates) if !candidates.is_empty() => {
                    debug!(
                        provider = %provider.name(),
                        count = candidates.len(),
                        "suggestions returned"
                    );
                    return candidates;
                }
                Ok(_) => {
                    debug!(provider = %provider.name(), "no suggestions, trying next");
                }
                Err(e) => {
                    debug!(provider = %provider.name(), error = %e, "suggestion request failed, trying next");
                }
            }
        }
        Vec::new()
    }

    /// Apply the per-call bound regardless of the adapter's own timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, ProviderError>>,
    ) -> std::result::Result<T, ProviderError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Confidence;
    use crate::provider::RawProviderResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider for chain-order tests.
    #[derive(Debug)]
    struct Scripted {
        kind: ProviderKind,
        outcome: fn() -> std::result::Result<Vec<GeocodeCandidate>, ProviderError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(
            kind: ProviderKind,
            outcome: fn() -> std::result::Result<Vec<GeocodeCandidate>, ProviderError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                kind,
                outcome,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                outcome: || Ok(vec![candidate("slow")]),
                delay: Duration::from_secs(5),
                calls: AtomicUsize::new(0),
            })
        }
    }

    fn chain(providers: Vec<Arc<Scripted>>) -> Vec<Arc<dyn GeocodeProvider>> {
        providers
            .into_iter()
            .map(|p| p as Arc<dyn GeocodeProvider>)
            .collect()
    }

    fn candidate(provider: &str) -> GeocodeCandidate {
        GeocodeCandidate::new(48.0, -123.0, "somewhere", provider, Some(Confidence::High))
    }

    #[async_trait]
    impl GeocodeProvider for Scripted {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn fetch(
            &self,
            _address: &str,
            _limit: usize,
        ) -> std::result::Result<RawProviderResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(RawProviderResponse {
                provider: self.kind,
                body: serde_json::Value::Null,
            })
        }

        fn parse(
            &self,
            _raw: &RawProviderResponse,
        ) -> std::result::Result<Vec<GeocodeCandidate>, ProviderError> {
            (self.outcome)()
        }
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let resolver = GeocodeResolver::new(Vec::new(), Duration::from_secs(1));
        assert_eq!(
            resolver.resolve("x").await.unwrap_err(),
            GeocodeError::NoProviders
        );
    }

    #[tokio::test]
    async fn test_failure_advances_to_next() {
        let first = Scripted::new(ProviderKind::Google, || Err(ProviderError::Outage(502)));
        let second = Scripted::new(ProviderKind::MapsCo, || Ok(vec![candidate("maps_co")]));
        let third = Scripted::new(ProviderKind::Nominatim, || Ok(vec![candidate("nominatim")]));
        let resolver = GeocodeResolver::new(
            chain(vec![first.clone(), second.clone(), third.clone()]),
            Duration::from_secs(1),
        );

        let result = resolver.resolve("x").await.unwrap();
        assert_eq!(result.provider_name, "maps_co");
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_result_advances_to_next() {
        let first = Scripted::new(ProviderKind::Google, || Ok(Vec::new()));
        let second = Scripted::new(ProviderKind::Nominatim, || Ok(vec![candidate("nominatim")]));
        let resolver = GeocodeResolver::new(chain(vec![first, second]), Duration::from_secs(1));
        assert_eq!(resolver.resolve("x").await.unwrap().provider_name, "nominatim");
    }

    #[tokio::test]
    async fn test_timeout_advances_to_next() {
        let slow = Scripted::slow(ProviderKind::Google);
        let fast = Scripted::new(ProviderKind::Nominatim, || Ok(vec![candidate("nominatim")]));
        let resolver = GeocodeResolver::new(chain(vec![slow.clone(), fast]), Duration::from_millis(50));

        let result = resolver.resolve("x").await.unwrap();
        assert_eq!(result.provider_name, "nominatim");
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_lists_every_provider() {
        let first = Scripted::new(ProviderKind::Google, || {
            Err(ProviderError::RateLimited("OVER_QUERY_LIMIT".into()))
        });
        let second = Scripted::new(ProviderKind::Nominatim, || Ok(Vec::new()));
        let resolver = GeocodeResolver::new(chain(vec![first, second]), Duration::from_secs(1));

        match resolver.resolve("nowhere").await.unwrap_err() {
            GeocodeError::Exhausted { address, details } => {
                assert_eq!(address, "nowhere");
                assert!(details.contains("google: rate limited"));
                assert!(details.contains("nominatim: no results"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_suggest_first_non_empty_wins() {
        let first = Scripted::new(ProviderKind::Google, || Err(ProviderError::Outage(500)));
        let second = Scripted::new(ProviderKind::MapsCo, || Ok(Vec::new()));
        let third = Scripted::new(ProviderKind::Nominatim, || {
            Ok(vec![candidate("nominatim"), candidate("nominatim")])
        });
        let resolver = GeocodeResolver::new(chain(vec![first, second, third]), Duration::from_secs(1));
        assert_eq!(resolver.suggest("x", 5).await.len(), 2);
        assert!(resolver.suggest("x", 0).await.is_empty());
    }

    #[test]
    fn test_from_config_skips_google_without_key() {
        let resolver = GeocodeResolver::from_config(&GeocodeConfig::default()).unwrap();
        assert_eq!(resolver.provider_names(), vec!["maps_co", "nominatim"]);

        let config = GeocodeConfig::default()
            .with_google_api_key("k")
            .with_providers(vec![ProviderKind::Nominatim, ProviderKind::Google, ProviderKind::Nominatim]);
        let resolver = GeocodeResolver::from_config(&config).unwrap();
        assert_eq!(resolver.provider_names(), vec!["nominatim", "google"]);
    }
}
