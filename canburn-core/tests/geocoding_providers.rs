//! LocationIQ and Nominatim adapters, and the resolver chaining them, against mocked APIs.

use std::time::Duration;

use canburn_core::{
    Config, GeocodeProvider, GeocodeResolver, ProviderId,
    provider::{
        locationiq::LocationIqProvider, openstreetmap::OpenStreetMapProvider,
        providers_from_config,
    },
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn montreal_body() -> serde_json::Value {
    json!([{
        "lat": "45.5017",
        "lon": "-73.5673",
        "display_name": "Montreal, QC, Canada",
        "address": {"city": "Montreal", "state": "Quebec", "country": "Canada"}
    }])
}

fn config_for(liq: &MockServer, osm: &MockServer) -> Config {
    let mut cfg = Config::default();
    cfg.geocoding.locationiq_base_url = liq.uri();
    cfg.geocoding.openstreetmap_base_url = osm.uri();
    cfg.geocoding.timeout_secs = 5;
    cfg.upsert_provider_api_key(ProviderId::LocationIq, "pk.test".into());
    cfg
}

#[tokio::test]
async fn locationiq_sends_key_and_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("key", "pk.test"))
        .and(query_param("q", "Montreal"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(montreal_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        LocationIqProvider::new(server.uri(), "pk.test".into(), Duration::from_secs(5)).unwrap();
    let candidates = provider.geocode("Montreal").await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].latitude, Some(45.5017));
    assert_eq!(candidates[0].city.as_deref(), Some("Montreal"));
}

#[tokio::test]
async fn locationiq_404_means_no_match() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "Unable to geocode"})),
        )
        .mount(&server)
        .await;

    let provider =
        LocationIqProvider::new(server.uri(), "pk.test".into(), Duration::from_secs(5)).unwrap();

    assert!(provider.geocode("Atlantis").await.unwrap().is_empty());
}

#[tokio::test]
async fn locationiq_401_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid key"})))
        .mount(&server)
        .await;

    let provider =
        LocationIqProvider::new(server.uri(), "bad".into(), Duration::from_secs(5)).unwrap();
    let err = provider.geocode("Montreal").await.unwrap_err();

    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn nominatim_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Café de Flore, Paris"))
        .and(header("user-agent", "CanIBurnAPI/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        OpenStreetMapProvider::new(server.uri(), "CanIBurnAPI/1.0", Duration::from_secs(5))
            .unwrap();

    assert!(provider.geocode("Café de Flore, Paris").await.unwrap().is_empty());
}

#[tokio::test]
async fn falls_back_to_nominatim_when_locationiq_fails() {
    let liq = MockServer::start().await;
    let osm = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&liq)
        .await;

    Mock::given(method("GET"))
        .and(query_param("q", "Montreal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(montreal_body()))
        .expect(1)
        .mount(&osm)
        .await;

    let resolver = GeocodeResolver::new(providers_from_config(&config_for(&liq, &osm)).unwrap());
    let result = resolver.resolve("  Montreal  ").await;

    assert_eq!(result.location, "Montreal");
    assert!(result.coordinates.is_some());
    assert!(result.message.is_none());
}

#[tokio::test]
async fn slow_locationiq_falls_back_to_nominatim() {
    let liq = MockServer::start().await;
    let osm = MockServer::start().await;

    // Only the late answer is empty, so coordinates must come from Nominatim.
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&liq)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(montreal_body()))
        .expect(1)
        .mount(&osm)
        .await;

    let providers: Vec<Box<dyn GeocodeProvider>> = vec![
        Box::new(
            LocationIqProvider::new(liq.uri(), "pk.test".into(), Duration::from_millis(50))
                .unwrap(),
        ),
        Box::new(
            OpenStreetMapProvider::new(osm.uri(), "CanIBurnAPI/1.0", Duration::from_secs(5))
                .unwrap(),
        ),
    ];
    let result = GeocodeResolver::new(providers).resolve("Montreal").await;

    let coords = result.coordinates.expect("nominatim coordinates");
    assert_eq!(coords.latitude, 45.5017);
    assert_eq!(coords.longitude, -73.5673);
    assert!(result.message.is_none());
}

#[tokio::test]
async fn primary_success_never_calls_fallback() {
    let liq = MockServer::start().await;
    let osm = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(montreal_body()))
        .mount(&liq)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&osm)
        .await;

    let resolver = GeocodeResolver::new(providers_from_config(&config_for(&liq, &osm)).unwrap());
    let result = resolver.resolve("Montreal").await;

    let details = result.details.expect("resolved");
    assert_eq!(details.formatted_address.as_deref(), Some("Montreal, QC, Canada"));
    assert_eq!(details.source, "geocoding");
}

#[tokio::test]
async fn malformed_payloads_from_both_fail() {
    let liq = MockServer::start().await;
    let osm = MockServer::start().await;

    for server in [&liq, &osm] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(server)
            .await;
    }

    let resolver = GeocodeResolver::new(providers_from_config(&config_for(&liq, &osm)).unwrap());
    let result = resolver.resolve("Montreal").await;

    assert!(result.coordinates.is_none());
    assert_eq!(result.message.as_deref(), Some("Failed to resolve location"));
}
