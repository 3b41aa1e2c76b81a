//! Shared HTTP plumbing for the provider clients
//!
//! One `reqwest::Client` is built from configuration and shared by both
//! providers. Responses are read as text first so transport failures and
//! body shape failures map onto different error kinds.

use crate::{Result, WeatherSiteError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const USER_AGENT: &str = concat!("WeatherSite/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used by all providers
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| WeatherSiteError::config(format!("Failed to create HTTP client: {e}")))
}

/// Replace the value of the `key` query parameter so URLs can be logged
#[must_use]
pub fn redact_key(url: &str) -> String {
    let Some(start) = url.find("key=") else {
        return url.to_string();
    };
    let value_start = start + "key=".len();
    let value_end = url[value_start..]
        .find('&')
        .map_or(url.len(), |offset| value_start + offset);
    format!("{}***{}", &url[..value_start], &url[value_end..])
}

/// GET `url` and decode the JSON body into `T`
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let logged_url = redact_key(url);
    let start_time = Instant::now();
    debug!("HTTP GET {}", logged_url);

    let response = client.get(url).send().await.map_err(|e| {
        let e = e.without_url();
        warn!("Network error for {}: {}", logged_url, e);
        WeatherSiteError::transport(format!("Network error: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let message = match status.as_u16() {
            401 | 403 => "API key was rejected by the provider".to_string(),
            404 => "Resource not found".to_string(),
            429 => "Provider rate limit exceeded".to_string(),
            _ => format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ),
        };
        error!("HTTP {} from {}: {}", status.as_u16(), logged_url, message);
        return Err(WeatherSiteError::transport(message));
    }

    let body = response.text().await?;
    let duration = start_time.elapsed();
    info!(
        "Received {} bytes from {} in {:.3}s",
        body.len(),
        logged_url,
        duration.as_secs_f64()
    );

    if duration.as_secs() > 5 {
        warn!("Slow API response detected: {:.3}s", duration.as_secs_f64());
    }

    serde_json::from_str(&body).map_err(|e| {
        error!("Failed to parse response from {}: {}", logged_url, e);
        WeatherSiteError::shape(format!("Invalid JSON response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_redact_key() {
        assert_eq!(
            redact_key("https://x.test/a?input=Berlin&key=secret"),
            "https://x.test/a?input=Berlin&key=***"
        );
        assert_eq!(
            redact_key("https://x.test/a?key=secret&days=7"),
            "https://x.test/a?key=***&days=7"
        );
        assert_eq!(redact_key("https://x.test/a"), "https://x.test/a");
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 3})))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let payload: Payload = get_json(&client, &format!("{}/ok", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(payload.value, 3);
    }

    #[tokio::test]
    async fn test_get_json_status_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let result: Result<Payload> = get_json(&client, &mock_server.uri()).await;
        assert!(matches!(result, Err(WeatherSiteError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_get_json_bad_body_is_shape_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let result: Result<Payload> = get_json(&client, &mock_server.uri()).await;
        assert!(matches!(result, Err(WeatherSiteError::Shape { .. })));
    }

    #[tokio::test]
    async fn test_get_json_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"value": 1}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_millis(50)).unwrap();
        let result: Result<Payload> = get_json(&client, &mock_server.uri()).await;
        assert!(matches!(result, Err(WeatherSiteError::Transport { .. })));
    }
}
