//! HTTP client for making requests to lookup providers

use super::request::{HttpRequest, HttpResponse};
use crate::config::OutgoingSettings;
use crate::lookup::{LookupError, LookupResult};
use anyhow::Result;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Response};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// HTTP client wrapper shared by all source fetchers
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let timeout = Duration::try_from_secs_f64(settings.request_timeout).map_err(|e| {
            anyhow::anyhow!("Invalid request_timeout {}: {}", settings.request_timeout, e)
        })?;

        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        let limiter = settings
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            client,
            default_timeout: timeout,
            user_agent: settings.user_agent.clone(),
            limiter,
        })
    }

    /// Execute a request
    pub async fn execute(&self, request: HttpRequest) -> LookupResult<HttpResponse> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute a request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: HttpRequest,
        timeout: Duration,
    ) -> LookupResult<HttpResponse> {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }

        let mut req_builder = self
            .client
            .get(&request.url)
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        // Add custom headers
        for (key, value) in &request.headers {
            req_builder = req_builder.header(key, value);
        }

        // Add query parameters
        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// Execute a request, giving up as soon as `cancel` fires.
    ///
    /// Dropping the in-flight future aborts the connection on a best-effort
    /// basis; a response the transport already received is discarded.
    pub async fn execute_cancellable(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> LookupResult<HttpResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LookupError::Cancelled),
            response = self.execute(request) => response,
        }
    }

    /// Parse response into HttpResponse
    async fn parse_response(response: Response) -> LookupResult<HttpResponse> {
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(HttpResponse { status, text })
    }

    /// Whether outbound requests are rate limited
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("default_timeout", &self.default_timeout)
            .field("user_agent", &self.user_agent)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
        assert!(!client.unwrap().is_rate_limited());
    }

    #[tokio::test]
    async fn test_rate_limited_client() {
        let settings = OutgoingSettings {
            requests_per_second: Some(5),
            ..OutgoingSettings::default()
        };
        let client = HttpClient::with_settings(&settings).unwrap();
        assert!(client.is_rate_limited());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        for request_timeout in [-1.0, f64::NAN, f64::INFINITY] {
            let settings = OutgoingSettings {
                request_timeout,
                ..OutgoingSettings::default()
            };
            assert!(HttpClient::with_settings(&settings).is_err());
        }
    }

    #[tokio::test]
    async fn test_get_with_params_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("text", "paris"))
            .and(header("Authorization", "Client-ID k"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let request = HttpRequest::get(format!("{}/search", server.uri()))
            .param("text", "paris")
            .header("Authorization", "Client-ID k");
        let response = client.execute(request).await.unwrap();

        assert!(response.is_success());
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let response = client.execute(HttpRequest::get(server.uri())).await.unwrap();
        assert_eq!(response.status, 401);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = client
            .execute_cancellable(HttpRequest::get(server.uri()), &cancel)
            .await;
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }
}
