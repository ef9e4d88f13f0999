//! End-to-end lookup scenarios against a mock OpenWeather server.

use std::{sync::Arc, time::Duration};

use clima_core::{
    ConfiguredLocation, Coordinate, WeatherSnapshot, Workflow, WorkflowState,
    provider::openweather::OpenWeatherProvider,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> Arc<OpenWeatherProvider> {
    Arc::new(
        OpenWeatherProvider::builder("TEST_KEY".into())
            .base_url(&server.uri())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap(),
    )
}

fn city_body(name: &str, temp: f64) -> serde_json::Value {
    json!({
        "name": name,
        "main": { "temp": temp, "feels_like": temp, "humidity": 55 },
        "weather": [{ "description": "nubes", "icon": "04d" }],
        "wind": { "speed": 4.1 }
    })
}

#[tokio::test]
async fn montevideo_by_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "-34.9"))
        .and(query_param("lon", "-56.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Montevideo",
            "sys": { "country": "UY" },
            "main": { "temp": 18.6, "feels_like": 17.9, "humidity": 70 },
            "weather": [{ "description": "cielo claro", "icon": "01d" }],
            "wind": { "speed": 3.2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut wf = Workflow::launch(
        provider_for(&server),
        Arc::new(ConfiguredLocation::fixed(Coordinate::new(-34.9, -56.2))),
    );

    assert_eq!(
        wf.settle().await,
        &WorkflowState::Ready(WeatherSnapshot {
            city: "Montevideo".into(),
            country: Some("UY".into()),
            temperature_c: 19,
            feels_like_c: 18,
            description: Some("cielo claro".into()),
            icon_code: Some("01d".into()),
            humidity_pct: 70,
            wind_speed_mps: 3.2,
            observed_at: None,
        })
    );
}

#[tokio::test]
async fn unknown_city_shows_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nonexistentville"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "city not found" })))
        .mount(&server)
        .await;

    let mut wf = Workflow::new(provider_for(&server), Arc::new(ConfiguredLocation::default()));
    wf.search_city("Nonexistentville").unwrap();

    assert_eq!(wf.settle().await, &WorkflowState::Error("city not found".into()));
}

#[tokio::test]
async fn denied_location_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(city_body("Anywhere", 1.0)))
        .expect(0)
        .mount(&server)
        .await;

    let mut wf = Workflow::launch(provider_for(&server), Arc::new(ConfiguredLocation::new(false, None)));

    assert_eq!(
        wf.settle().await,
        &WorkflowState::Error("location permission denied; search a city".into())
    );
}

#[tokio::test]
async fn slow_paris_does_not_clobber_tokyo() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(city_body("Paris", 12.2))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(city_body("Tokyo", 21.5)))
        .mount(&server)
        .await;

    let mut wf = Workflow::new(provider_for(&server), Arc::new(ConfiguredLocation::default()));
    wf.search_city("Paris").unwrap();
    wf.search_city("Tokyo").unwrap();

    let tokyo = wf.settle().await.snapshot().cloned().unwrap();
    assert_eq!(tokyo.city, "Tokyo");
    assert_eq!(tokyo.temperature_c, 22);

    // Paris arrives afterwards and must be ignored.
    let late = wf.next_completion().await.unwrap();
    assert!(!wf.apply(late));
    assert_eq!(wf.state().snapshot().map(|s| s.city.as_str()), Some("Tokyo"));
}
