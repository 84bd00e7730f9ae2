//! HTTP client abstraction for external API communication.
//!
//! This module provides a trait-based abstraction over HTTP clients, enabling
//! dependency injection and easy mocking in tests.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Upper bound for a single provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP communication with external APIs.
///
/// This abstraction allows injecting mock HTTP clients for testing without
/// making real network requests.
///
/// # Example
///
/// ```ignore
/// use xplc::http_client::{HttpClient, ReqwestHttpClient};
///
/// let client = ReqwestHttpClient::new()?;
/// let response = client.post_json(
///     "https://api.example.com/endpoint",
///     &[("Content-Type", "application/json")],
///     &serde_json::json!({"key": "value"}),
/// ).await?;
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with JSON body and returns the response.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to send the request to
    /// * `headers` - Key-value pairs of headers to include
    /// * `body` - The JSON body to send
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response cannot
    /// be read. Non-2xx statuses are not errors at this layer.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse>;
}

/// HTTP client implementation using reqwest.
///
/// This is the default production implementation that makes real HTTP requests.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        // Some URLs carry credentials in the query string; keep them out of errors.
        let response = request
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_is_success_range() {
        let ok = HttpResponse { status: 200, body: String::new() };
        let created = HttpResponse { status: 201, body: String::new() };
        let unauthorized = HttpResponse { status: 401, body: String::new() };
        let redirect = HttpResponse { status: 302, body: String::new() };

        assert!(ok.is_success());
        assert!(created.is_success());
        assert!(!unauthorized.is_success());
        assert!(!redirect.is_success());
    }

    #[tokio::test]
    async fn test_post_json_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .and(header("x-api-key", "secret"))
            .and(body_json(json!({"hello": "world"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let response = client
            .post_json(
                &format!("{}/v1/echo", server.uri()),
                &[("x-api-key", "secret")],
                &json!({"hello": "world"}),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_post_json_returns_error_status_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::new().unwrap();
        let response = client
            .post_json(&server.uri(), &[], &json!({}))
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert_eq!(response.body, "slow down");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_post_json_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::with_timeout(Duration::from_millis(100)).unwrap();
        let result = client.post_json(&server.uri(), &[], &json!({})).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_send_error_does_not_include_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ReqwestHttpClient::with_timeout(Duration::from_millis(100)).unwrap();
        let url = format!("{}/generate?key=SECRET-QUERY-KEY", server.uri());
        let err = client.post_json(&url, &[], &json!({})).await.unwrap_err();

        let message = format!("{:#}", err);
        assert!(!message.contains("SECRET-QUERY-KEY"), "leaked: {}", message);
        assert!(!message.contains(&server.uri()), "leaked: {}", message);
    }

    #[tokio::test]
    async fn test_connection_error_does_not_include_url() {
        // Nothing listens on port 9 (discard) in the test environment.
        let client = ReqwestHttpClient::new().unwrap();
        let err = client
            .post_json("http://127.0.0.1:9/v1?key=SECRET-QUERY-KEY", &[], &json!({}))
            .await
            .unwrap_err();

        assert!(!format!("{:#}", err).contains("SECRET-QUERY-KEY"));
    }
}
