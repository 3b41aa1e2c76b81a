//! Integration tests for the search-to-forecast pipeline

use weathersite::{
    GeoPoint, PipelineState, RunId, RunOutcome, SuggestOutcome, WeatherSiteConfig,
    session_from_config,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_days(start_day: u32, count: u32) -> Vec<serde_json::Value> {
    (0..count)
        .map(|offset| {
            serde_json::json!({
                "datetime": format!("2024-03-{:02}", start_day + offset),
                "temp": 4.0 + f64::from(offset),
                "min_temp": 0.5,
                "max_temp": 9.5,
                "precip": 0.75,
                "weather": {"description": "Overcast clouds", "icon": "c04d", "code": 804}
            })
        })
        .collect()
}

async fn berlin_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .and(query_param("input", "Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "predictions": [{"place_id": "abc", "description": "Berlin, Germany"}],
            "status": "OK"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"geometry": {"location": {"lat": 52.52, "lng": 13.405}}},
            "status": "OK"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", "broken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {},
            "status": "OK"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather/forecast/daily"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lon", "13.405"))
        .and(query_param("days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city_name": "Berlin",
            "country_code": "DE",
            "data": forecast_days(7, 7)
        })))
        .mount(&server)
        .await;

    server
}

fn config_for(server: &MockServer) -> WeatherSiteConfig {
    let mut config = WeatherSiteConfig::with_keys("test_places_key", "test_weather_key");
    config.places.base_url = format!("{}/place", server.uri());
    config.forecast.base_url = format!("{}/weather", server.uri());
    config
}

#[tokio::test]
async fn test_berlin_end_to_end() {
    let server = berlin_server().await;
    let session = session_from_config(&config_for(&server)).unwrap();

    assert_eq!(session.on_input("Berlin").await, SuggestOutcome::Updated(1));
    let suggestions = session.suggestions();
    assert_eq!(suggestions[0].id, "abc");
    assert_eq!(suggestions[0].description, "Berlin, Germany");

    let outcome = session.select(&suggestions[0]).await;
    assert_eq!(outcome, RunOutcome::Ready(RunId(1)));

    let bundle = session.bundle().unwrap();
    assert_eq!(bundle.today.date, "07.03");
    assert_eq!(bundle.today.day_name, "Thursday");
    assert_eq!(bundle.upcoming.len(), 6);
    assert_eq!(bundle.upcoming[0].date, "08.03");
    assert_eq!(bundle.upcoming[5].date, "13.03");
    assert_eq!(bundle.location.name, "Berlin");
    assert_eq!(bundle.location.country_code, "DE");
    assert_eq!(bundle.location.point, GeoPoint::new(52.52, 13.405));
    assert!(session.input().is_empty());
    assert!(session.suggestions().is_empty());
}

#[tokio::test]
async fn test_broken_geometry_keeps_previous_bundle() {
    let server = berlin_server().await;
    let session = session_from_config(&config_for(&server)).unwrap();

    session.on_input("Berlin").await;
    let berlin = session.suggestions()[0].clone();
    session.select(&berlin).await;
    let before = session.bundle();
    assert!(before.is_some());

    let broken = weathersite::Suggestion::new("broken", "Broken place");
    let outcome = session.select(&broken).await;

    assert!(matches!(outcome, RunOutcome::Failed { run: RunId(2), .. }));
    assert_eq!(session.bundle(), before);
    assert!(matches!(
        session.pipeline_state(),
        PipelineState::Failed { .. }
    ));

    let forecast_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/weather/forecast/daily")
        .count();
    assert_eq!(forecast_requests, 1);
}

#[tokio::test]
async fn test_unreachable_provider_leaves_state_untouched() {
    let server = berlin_server().await;
    let mut config = config_for(&server);
    config.places.base_url = "http://127.0.0.1:9".to_string();
    config.http.timeout_seconds = 2;
    let session = session_from_config(&config).unwrap();

    let outcome = session.on_input("Berlin").await;

    assert!(matches!(outcome, SuggestOutcome::Failed(_)));
    assert!(session.suggestions().is_empty());
    assert!(!session.is_loading());
    assert!(session.bundle().is_none());
}
