//! HTTP client for the maps API

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, Span};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Maps API client with retry and request correlation
///
/// Rate limiting is not done here: the geocoder and directions queues share
/// one limiter in front of every provider call.
#[derive(Debug, Clone)]
pub struct MapsClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl MapsClient {
    /// Create a client from environment configuration
    pub fn from_env() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("storefinder/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET `path` under the base URL with `query`, plus the API key
    #[instrument(skip(self, query), fields(request_id))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let url = format!("{}/{}", self.config.base_url, path.trim_start_matches('/'));
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        self.execute_with_retry(&request_id, &url, query).await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<T: DeserializeOwned>(
        &self,
        request_id: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(request_id, url, query).await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt + 1 < retry_config.max_attempts => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, will retry"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request<T: DeserializeOwned>(
        &self,
        request_id: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let mut request = self
            .inner
            .get(url)
            .header(X_REQUEST_ID, request_id)
            .query(query);

        if let Some(ref key) = self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle HTTP response and deserialize
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}
