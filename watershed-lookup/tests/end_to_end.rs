//! End-to-end lookups over the packaged sample dataset with mocked
//! geocoding providers.

use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use watershed_core::{Coordinate, Country, NameTable, WatershedRecord};
use watershed_geocode::{
    AddressValidator, GeocodeConfig, GeocodeError, GeocodeResolver, ProviderKind,
    ValidatorConfig,
};
use watershed_lookup::{
    CacheConfig, CachedLookup, LookupError, LookupOutcome, WatershedLookup,
};
use watershed_spatial::{BoundarySet, ContainmentQuery};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VICTORIA: &str = "1620 Belmont Ave, Victoria, BC, Canada";
const SEATTLE: &str = "123 Main Street, Seattle, WA";
const GARBLED: &str = "Belmnt Avenu, Victorria";
const OCEAN: &str = "1 Ocean Way, Pacific";

/// Counts containment lookups so tests can assert none happened.
struct CountingQuery {
    inner: BoundarySet,
    calls: AtomicUsize,
}

impl CountingQuery {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContainmentQuery for CountingQuery {
    fn locate(
        &self,
        coordinate: Coordinate,
    ) -> watershed_spatial::Result<Option<&WatershedRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.containing(coordinate)
    }

    fn names(&self) -> &NameTable {
        self.inner.names()
    }
}

fn sample() -> BoundarySet {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/cascadia_sample.geojson");
    watershed_spatial::load(path).unwrap()
}

fn google_result(lat: f64, lng: f64, address: &str, location_type: &str) -> serde_json::Value {
    json!({
        "status": "OK",
        "results": [{
            "formatted_address": address,
            "geometry": {"location": {"lat": lat, "lng": lng}, "location_type": location_type}
        }]
    })
}

async fn mount_google(server: &MockServer, address: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("address", address))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Google knows Victoria, the garbled address (approximately) and the
/// ocean point; Nominatim knows Seattle.
async fn providers() -> (MockServer, MockServer) {
    let google = MockServer::start().await;
    let nominatim = MockServer::start().await;

    mount_google(
        &google,
        VICTORIA,
        google_result(48.4280, -123.3389, "1620 Belmont Ave, Victoria, BC V8R 3Z3, Canada", "ROOFTOP"),
    )
    .await;
    mount_google(
        &google,
        GARBLED,
        google_result(48.4284, -123.3656, "Victoria, BC, Canada", "APPROXIMATE"),
    )
    .await;
    mount_google(
        &google,
        OCEAN,
        google_result(48.2, -125.5, "1 Ocean Way, Pacific Ocean", "ROOFTOP"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ZERO_RESULTS", "results": []})))
        .mount(&google)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", SEATTLE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "lat": "47.6003",
            "lon": "-122.3310",
            "display_name": "123, Main Street, Pioneer Square, Seattle, King County, Washington, 98104, United States"
        }])))
        .mount(&nominatim)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&nominatim)
        .await;

    (google, nominatim)
}

fn resolver(google: &MockServer, nominatim: &MockServer) -> GeocodeResolver {
    let config = GeocodeConfig::default()
        .with_providers(vec![ProviderKind::Google, ProviderKind::Nominatim])
        .with_google_api_key("test-key")
        .with_timeout_ms(2_000)
        .with_base_url(ProviderKind::Google, google.uri())
        .with_base_url(ProviderKind::Nominatim, nominatim.uri());
    GeocodeResolver::from_config(&config).unwrap()
}

fn counting_lookup(google: &MockServer, nominatim: &MockServer) -> WatershedLookup<CountingQuery> {
    let query = CountingQuery {
        inner: sample(),
        calls: AtomicUsize::new(0),
    };
    WatershedLookup::new(
        query,
        resolver(google, nominatim),
        AddressValidator::new(ValidatorConfig::default()),
    )
}

#[tokio::test]
async fn victoria_resolves_to_vancouver_island_east() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    let outcome = lookup.lookup(VICTORIA).await.unwrap();
    let result = outcome.as_found().expect("found");

    assert!((result.coordinate.latitude - 48.4280).abs() < 1e-6);
    assert!((result.coordinate.longitude + 123.3389).abs() < 1e-6);
    assert_eq!(result.watershed.name, "Victoria Harbour");
    assert_eq!(result.watershed.country, Country::Ca);
    assert_eq!(result.provider, "google");

    let top = result.hierarchy.coarsest().unwrap();
    assert_eq!(top.level, "fwa_principal_drainage");
    assert_eq!(top.code, "920");
    assert_eq!(top.name.as_deref(), Some("Vancouver Island East"));
    assert_eq!(lookup.query().calls(), 1);
}

#[tokio::test]
async fn seattle_resolves_to_pacific_northwest_region() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    let outcome = lookup.lookup(SEATTLE).await.unwrap();
    let result = outcome.as_found().expect("found");

    assert_eq!(result.provider, "nominatim");
    assert_eq!(result.confidence, None);
    assert_eq!(result.watershed.country, Country::Us);
    let finest = result.hierarchy.finest().unwrap();
    assert_eq!(finest.code.len(), 12);
    assert!(finest.code.starts_with("17"));
    assert_eq!(result.hierarchy.coarsest().unwrap().code, "17");
    assert_eq!(result.hierarchy.len(), 6);
}

#[tokio::test]
async fn impossible_primary_coordinate_falls_through_to_next_provider() {
    let google = MockServer::start().await;
    let nominatim = MockServer::start().await;
    mount_google(
        &google,
        VICTORIA,
        google_result(148.43, -123.3389, "1620 Belmont Ave, Victoria, BC V8R 3Z3, Canada", "ROOFTOP"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", VICTORIA))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "lat": "48.4280",
            "lon": "-123.3389",
            "display_name": "1620, Belmont Avenue, Fernwood, Victoria, British Columbia, V8R 3Z4, Canada"
        }])))
        .expect(1)
        .mount(&nominatim)
        .await;

    let lookup = counting_lookup(&google, &nominatim);
    let outcome = lookup.lookup(VICTORIA).await.unwrap();
    let result = outcome.as_found().expect("found");

    assert_eq!(result.provider, "nominatim");
    assert!((result.coordinate.latitude - 48.4280).abs() < 1e-6);
    assert_eq!(result.watershed.name, "Victoria Harbour");
}

#[tokio::test]
async fn garbled_address_yields_suggestions_without_containment() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    match lookup.lookup(GARBLED).await.unwrap() {
        LookupOutcome::Rejected(failure) => {
            assert!(!failure.suggestions.is_empty());
            assert_eq!(failure.input_address, GARBLED);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(lookup.query().calls(), 0);
}

#[tokio::test]
async fn ocean_point_is_not_found_with_coordinate() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    match lookup.lookup(OCEAN).await.unwrap() {
        LookupOutcome::NotFound(nf) => {
            assert_eq!(nf.coordinate, Coordinate::new(48.2, -125.5));
            assert_eq!(nf.formatted_address.as_deref(), Some("1 Ocean Way, Pacific Ocean"));
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_address_is_a_geocode_error() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    let err = lookup.lookup("nowhere at all").await.unwrap_err();
    assert!(matches!(err, LookupError::Geocode(GeocodeError::Exhausted { .. })));
    assert_eq!(lookup.query().calls(), 0);
}

#[tokio::test]
async fn empty_address_is_rejected_before_geocoding() {
    let google = MockServer::start().await;
    let nominatim = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&google)
        .await;
    let lookup = counting_lookup(&google, &nominatim);

    assert_eq!(lookup.lookup("  \n  ").await.unwrap_err(), LookupError::EmptyAddress);
}

#[tokio::test]
async fn validate_does_not_touch_containment() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    let outcome = lookup.validate(VICTORIA).await.unwrap();
    assert!(matches!(outcome, watershed_lookup::ValidationOutcome::Accepted(_)));
    assert_eq!(lookup.query().calls(), 0);
}

#[tokio::test]
async fn locate_skips_geocoding() {
    let (google, nominatim) = providers().await;
    let lookup = counting_lookup(&google, &nominatim);

    let m = lookup
        .locate(Coordinate::new(49.2, -123.0))
        .unwrap()
        .expect("inside Lower Pitt");
    assert_eq!(m.watershed.name, "Lower Pitt River");
    let codes: Vec<_> = m.hierarchy.levels().iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes.last(), Some(&"100"));
    assert!(lookup.locate(Coordinate::new(10.0, 10.0)).unwrap().is_none());
}

#[tokio::test]
async fn dropping_lookup_abandons_slow_provider() {
    let google = MockServer::start().await;
    let nominatim = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(google_result(48.4, -123.3, "x", "ROOFTOP"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&google)
        .await;
    let lookup = counting_lookup(&google, &nominatim);

    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_millis(100), lookup.lookup(VICTORIA)).await;
    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn concurrent_lookups_share_one_index() {
    let (google, nominatim) = providers().await;
    let lookup = Arc::new(counting_lookup(&google, &nominatim));

    let tasks: Vec<_> = [VICTORIA, SEATTLE, OCEAN, VICTORIA]
        .into_iter()
        .map(|address| {
            let lookup = Arc::clone(&lookup);
            tokio::spawn(async move { lookup.lookup(address).await })
        })
        .collect();
    let outcomes = futures::future::join_all(tasks).await;

    let found = outcomes
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .filter(|o| o.as_found().is_some())
        .count();
    assert_eq!(found, 3);
    assert_eq!(lookup.query().calls(), 4);
}

#[tokio::test]
async fn cache_serves_repeat_lookups() {
    let google = MockServer::start().await;
    let nominatim = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(google_result(
            48.4280,
            -123.3389,
            "1620 Belmont Ave, Victoria, BC V8R 3Z3, Canada",
            "ROOFTOP",
        )))
        .expect(1)
        .mount(&google)
        .await;

    let cached = CachedLookup::new(
        counting_lookup(&google, &nominatim),
        &CacheConfig::default().with_ttl_secs(60),
    );
    let respelled = "1620 belmont avenue, victoria, british columbia, canada";
    let first = cached.lookup(VICTORIA).await.unwrap();
    // Same address, different spelling: same normalized key.
    let second = cached.lookup(respelled).await.unwrap();

    let (first, second) = (first.as_found().unwrap(), second.as_found().unwrap());
    assert_eq!(first.input_address, VICTORIA);
    assert_eq!(second.input_address, respelled);
    assert_eq!(first.watershed, second.watershed);
    assert_eq!(first.coordinate, second.coordinate);

    let stats = cached.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[tokio::test]
async fn cache_skips_rejections() {
    let (google, nominatim) = providers().await;
    let cached = CachedLookup::new(counting_lookup(&google, &nominatim), &CacheConfig::default());

    for _ in 0..2 {
        let outcome = cached.lookup(GARBLED).await.unwrap();
        assert!(matches!(outcome, LookupOutcome::Rejected(_)));
    }
    let stats = cached.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (0, 2, 0));
}

#[tokio::test]
async fn disabled_cache_passes_through() {
    let (google, nominatim) = providers().await;
    let cached = CachedLookup::new(
        counting_lookup(&google, &nominatim),
        &CacheConfig::default().with_ttl_secs(0),
    );
    cached.lookup(VICTORIA).await.unwrap();
    cached.lookup(VICTORIA).await.unwrap();
    assert_eq!(cached.inner().query().calls(), 2);
    assert_eq!(cached.stats().entries, 0);
}
