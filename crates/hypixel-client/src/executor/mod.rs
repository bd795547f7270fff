//! Rate-limited, retrying GET executor.
//!
//! Every attempt goes through the shared [`RateLimiter`]:
//!
//! 1. wait for the gate to open
//! 2. send the request and read the rate-limit headers
//! 3. close the gate again with a cool-down derived from the response
//!
//! 2xx returns the parsed body. 429 and 5xx are retried until the attempt
//! budget runs out. Any other status fails immediately with a typed error.

mod rate_limit_headers;


pub use rate_limit_headers::{
    classify, server_error_backoff, AttemptOutcome, RateLimitHints, RATELIMIT_REMAINING,
    RATELIMIT_RESET, RETRY_AFTER,
};

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ClientError, ErrorKind};
use crate::rate_limiter::RateLimiter;
use crate::transport::{build_headers, build_url, ReqwestTransport, Transport};
use crate::types::{ClientConfig, Payload, ResponseFormat};

/// Sends GET requests through a shared [`RateLimiter`], retrying 429 and 5xx.
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    limiter: RateLimiter,
    headers: HeaderMap,
    base_url: String,
    max_attempts: u32,
}

impl HttpClient {
    /// Creates an executor backed by a [`ReqwestTransport`] built from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates an executor that sends through a caller-supplied transport.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            transport,
            limiter: RateLimiter::new(),
            headers: build_headers(&config.api_key)?,
            base_url: config.base_url.clone(),
            max_attempts: config.attempts(),
        })
    }

    /// The gate shared by every request made through this executor.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Performs a rate-limited, retried `GET {base_url}{endpoint}?{params}`.
    ///
    /// Each attempt releases the gate exactly once: with the server's cool-down
    /// on success and terminal errors, with `retry-after` on 429, and with a
    /// widening back-off on 5xx. Once the budget is spent the last release has
    /// no delay. Transport errors propagate as-is.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        format: ResponseFormat,
    ) -> Result<Payload, ClientError> {
        let url = build_url(&self.base_url, endpoint);
        let query: Vec<(String, String)> =
            params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await;

            let response = self.transport.get(&url, &query, &self.headers).await?;
            let status = response.status();

            let hints = match RateLimitHints::from_response(&response) {
                Ok(hints) => hints,
                Err(e) => {
                    self.limiter.release(Duration::ZERO);
                    tracing::error!("{} returned {} without rate-limit headers", endpoint, status);
                    return Err(e);
                },
            };

            tracing::debug!(
                "GET {} | Status: {} | Remaining: {} | Reset: {}s | Attempt: {}/{}",
                endpoint,
                status,
                hints.remaining,
                hints.reset_after,
                attempt + 1,
                self.max_attempts
            );

            match classify(status, &hints, attempt) {
                AttemptOutcome::Success { cooldown } => {
                    self.limiter.release(cooldown);
                    return format.parse(response);
                },
                AttemptOutcome::Terminal { kind, cooldown } => {
                    self.limiter.release(cooldown);
                    tracing::debug!("GET {} failed with {} ({})", endpoint, kind, status);
                    return Err(ClientError::api(kind, response));
                },
                AttemptOutcome::Retry { cooldown } => {
                    attempt += 1;

                    if attempt >= self.max_attempts {
                        // Nothing left to wait for; leave the gate open for the next caller.
                        self.limiter.release(Duration::ZERO);
                        let kind = if status.is_server_error() {
                            ErrorKind::ServerError
                        } else {
                            ErrorKind::from_status(status.as_u16())
                        };
                        tracing::error!(
                            "GET {} gave up after {} attempts, last status {}",
                            endpoint,
                            attempt,
                            status
                        );
                        return Err(ClientError::api(kind, response));
                    }

                    self.limiter.release(cooldown);
                    tracing::warn!(
                        "GET {} returned {}, retrying in {}s (attempt {}/{})",
                        endpoint,
                        status,
                        cooldown.as_secs(),
                        attempt + 1,
                        self.max_attempts
                    );
                },
            }
        }
    }

    /// Like [`HttpClient::request`], with the format given by name.
    ///
    /// An unknown name fails before anything is sent.
    pub async fn request_as(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        format: &str,
    ) -> Result<Payload, ClientError> {
        let format: ResponseFormat = format.parse()?;
        self.request(endpoint, params, format).await
    }

    /// Requests `endpoint` as strict JSON and deserializes it into `T`.
    ///
    /// A body of the wrong shape is reported as `InvalidResponse`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let value = self.request(endpoint, params, ResponseFormat::Json).await?.into_json()?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", endpoint, e)))
    }
}
