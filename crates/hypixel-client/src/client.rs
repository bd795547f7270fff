use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ClientError;
use crate::executor::HttpClient;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::*;

/// Envelope around the `/key` response.
#[derive(Deserialize)]
struct KeyResponse {
    record: Key,
}

pub struct HypixelClient {
    http: HttpClient,
    config: ClientConfig,
}

impl HypixelClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::new(api_key))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http = HttpClient::new(&config)?;
        tracing::debug!("Hypixel client ready for {}", config.base_url);
        Ok(Self { http, config })
    }

    /// Uses an existing `reqwest::Client` and its connection pool.
    pub fn with_http_client(config: ClientConfig, client: Client) -> Result<Self, ClientError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::from_client(client)))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ClientError> {
        let http = HttpClient::with_transport(&config, transport)?;
        Ok(Self { http, config })
    }

    /// Status of the configured API key.
    pub async fn get_key_info(&self) -> Result<Key, ClientError> {
        let response: KeyResponse = self.http.get_json("/key", &[]).await?;
        Ok(response.record)
    }

    /// Executor for endpoints without a dedicated method.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shuts the client down, dropping the connection pool and any pending gate timer.
    pub fn close(self) {
        tracing::debug!("Closing Hypixel client for {}", self.config.base_url);
    }
}
