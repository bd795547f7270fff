//! Request, response and configuration types for the Hypixel client.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Root of the public Hypixel API.
pub const DEFAULT_BASE_URL: &str = "https://api.hypixel.net";

/// A fully-read HTTP response.
///
/// Returned as-is for [`ResponseFormat::Response`] and attached to every
/// [`ClientError::Api`] so callers can inspect what the server sent.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(
        url: impl Into<String>,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self { url: url.into(), status, headers, body }
    }

    /// Final URL the response was served from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Header value parsed as a non-negative integer.
    ///
    /// Returns `None` when the header is absent or not a plain integer.
    pub fn header_u64(&self, name: &str) -> Option<u64> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).and_then(|s| s.trim().parse().ok())
    }
}

/// Shape in which a successful response body is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Body bytes, untouched.
    Raw,
    /// Body as text.
    Text,
    /// Body as JSON; malformed JSON is an error.
    #[default]
    Json,
    /// JSON if the body parses, text otherwise.
    Auto,
    /// The whole [`ApiResponse`].
    Response,
}

impl ResponseFormat {
    pub const ALL: [ResponseFormat; 5] = [
        ResponseFormat::Raw,
        ResponseFormat::Text,
        ResponseFormat::Json,
        ResponseFormat::Auto,
        ResponseFormat::Response,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Raw => "raw",
            ResponseFormat::Text => "text",
            ResponseFormat::Json => "json",
            ResponseFormat::Auto => "auto",
            ResponseFormat::Response => "response",
        }
    }

    /// Converts a response into the payload this format describes.
    pub fn parse(self, response: ApiResponse) -> Result<Payload, ClientError> {
        match self {
            ResponseFormat::Raw => Ok(Payload::Raw(response.body)),
            ResponseFormat::Text => Ok(Payload::Text(response.text())),
            ResponseFormat::Json => Ok(Payload::Json(response.json()?)),
            ResponseFormat::Auto => match response.json::<serde_json::Value>() {
                Ok(value) => Ok(Payload::Json(value)),
                Err(_) => Ok(Payload::Text(response.text())),
            },
            ResponseFormat::Response => Ok(Payload::Response(response)),
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ClientError::UnknownFormat(s.to_string()))
    }
}

/// Parsed body of a successful request.
#[derive(Debug, Clone)]
pub enum Payload {
    Raw(Bytes),
    Text(String),
    Json(serde_json::Value),
    Response(ApiResponse),
}

impl Payload {
    /// Returns the JSON value, or `InvalidResponse` for any other payload shape.
    pub fn into_json(self) -> Result<serde_json::Value, ClientError> {
        match self {
            Payload::Json(value) => Ok(value),
            other => Err(ClientError::InvalidResponse(format!(
                "expected a JSON payload, got {}",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Payload::Raw(_) => "raw bytes",
            Payload::Text(_) => "text",
            Payload::Json(_) => "JSON",
            Payload::Response(_) => "a response handle",
        }
    }
}

/// Status of an API key as reported by the `/key` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// The key itself.
    pub key: String,
    /// UUID of the player that owns the key.
    pub owner: String,
    /// Requests allowed per rate-limit window.
    pub limit: u64,
    /// Requests made with this key in the last minute.
    #[serde(rename = "queriesInPastMin")]
    pub queries_in_past_minute: u64,
    /// Requests made with this key since it was issued.
    #[serde(rename = "totalQueries")]
    pub total_queries: u64,
}

/// Configuration for the Hypixel client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// API key sent in the `API-Key` header.
    pub api_key: String,
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// Attempts per logical request, including the first one.
    pub max_attempts: u32,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), ..Default::default() }
    }

    /// Attempt budget, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            max_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &'static str) -> ApiResponse {
        let url = "https://api.hypixel.net/key";
        ApiResponse::new(url, StatusCode::OK, HeaderMap::new(), Bytes::from(body))
    }

    #[test]
    fn test_format_from_str_round_trips_names() {
        for format in ResponseFormat::ALL {
            assert_eq!(format.as_str().parse::<ResponseFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_format_from_str_rejects_unknown() {
        let err = "xml".parse::<ResponseFormat>().unwrap_err();
        assert!(matches!(err, ClientError::UnknownFormat(ref s) if s == "xml"));
        assert!(err.to_string().contains("raw, text, json, auto, response"));
    }

    #[test]
    fn test_auto_falls_back_to_text() {
        let payload = ResponseFormat::Auto.parse(response("not json")).unwrap();
        assert!(matches!(payload, Payload::Text(ref s) if s == "not json"));

        let payload = ResponseFormat::Auto.parse(response(r#"{"success":true}"#)).unwrap();
        assert!(matches!(payload, Payload::Json(ref v) if v["success"] == true));
    }

    #[test]
    fn test_strict_json_rejects_malformed_body() {
        let err = ResponseFormat::Json.parse(response("{oops")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidJson(_)));
    }

    #[test]
    fn test_header_u64_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("ratelimit-remaining", "12".parse().unwrap());
        headers.insert("ratelimit-reset", "soon".parse().unwrap());
        let resp = ApiResponse::new("u", StatusCode::OK, headers, Bytes::new());
        assert_eq!(resp.header_u64("ratelimit-remaining"), Some(12));
        assert_eq!(resp.header_u64("ratelimit-reset"), None);
        assert_eq!(resp.header_u64("retry-after"), None);
    }

    #[test]
    fn test_key_deserializes_wire_names() {
        let key: Key = serde_json::from_str(
            r#"{"key":"abc","owner":"uuid","limit":300,"queriesInPastMin":4,"totalQueries":99}"#,
        )
        .unwrap();
        assert_eq!(key.queries_in_past_minute, 4);
        assert_eq!(key.total_queries, 99);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let config = ClientConfig { max_attempts: 0, ..ClientConfig::new("k") };
        assert_eq!(config.attempts(), 1);
    }
}
