//! Outbound HTTP transport.
//!
//! [`Transport`] is the seam between the retry loop and the network: one GET,
//! answered with a fully-read [`ApiResponse`]. [`ReqwestTransport`] is the
//! production implementation.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{ApiResponse, ClientConfig};

/// Header carrying the API key (`API-Key`; header names are case-insensitive).
pub const API_KEY_HEADER: &str = "api-key";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("hypixel-client/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `GET url?query` with `headers` and reads the whole body.
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &header::HeaderMap,
    ) -> Result<ApiResponse, ClientError>;
}

/// Transport backed by a shared `reqwest::Client` connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client with the configured total timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one shared with the rest of an application.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &header::HeaderMap,
    ) -> Result<ApiResponse, ClientError> {
        let resp = self.client.get(url).query(query).headers(headers.clone()).send().await?;

        let final_url = resp.url().to_string();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(ApiResponse::new(final_url, status, headers, body))
    }
}

/// Builds the fixed header set sent with every request.
pub fn build_headers(api_key: &str) -> Result<header::HeaderMap, ClientError> {
    let mut headers = header::HeaderMap::new();
    let key = header::HeaderValue::from_str(api_key)
        .map_err(|e| ClientError::InvalidConfig(format!("API key is not a valid header: {}", e)))?;
    headers.insert(API_KEY_HEADER, key);
    headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
    Ok(headers)
}

pub fn build_url(base_url: &str, endpoint: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint)
}
