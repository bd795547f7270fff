//! Error types for the Hypixel client.

use std::fmt;
use thiserror::Error;

use crate::types::ApiResponse;

/// Classification of a non-success HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 400: a required field was missing from the request.
    DataMissing,
    /// 422: a request field was malformed.
    DataInvalid,
    /// 403: the API key is invalid or lacks access.
    Forbidden,
    /// 429: the key exceeded its quota.
    TooManyRequests,
    /// 5xx, after the attempt budget ran out.
    ServerError,
    /// Any other status.
    Generic,
}

impl ErrorKind {
    /// Maps a terminal client-error status to its kind.
    ///
    /// 5xx statuses land in [`ErrorKind::Generic`] here; the executor reports
    /// [`ErrorKind::ServerError`] itself once retries are exhausted.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::DataMissing,
            403 => ErrorKind::Forbidden,
            422 => ErrorKind::DataInvalid,
            429 => ErrorKind::TooManyRequests,
            _ => ErrorKind::Generic,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DataMissing => "data missing",
            ErrorKind::DataInvalid => "data invalid",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::TooManyRequests => "too many requests",
            ErrorKind::ServerError => "Hypixel server error",
            ErrorKind::Generic => "HTTP error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when using the Hypixel client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Caller asked for a response format that does not exist.
    #[error("Unknown response format '{0}', expected one of: raw, text, json, auto, response")]
    UnknownFormat(String),

    /// Server sent neither `ratelimit-reset` nor `retry-after`.
    #[error("Response ({status}) is missing the ratelimit-reset and retry-after headers")]
    MissingRateLimitHeaders {
        /// HTTP status code of the offending response.
        status: u16,
    },

    /// Body was not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Body parsed but did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration cannot be used to build requests.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Server answered with a non-success status.
    #[error("{kind} ({}) for {}", response.status().as_u16(), response.url())]
    Api {
        /// Classification of the status.
        kind: ErrorKind,
        /// The response that triggered the error.
        response: Box<ApiResponse>,
    },
}

impl ClientError {
    pub(crate) fn api(kind: ErrorKind, response: ApiResponse) -> Self {
        ClientError::Api { kind, response: Box::new(response) }
    }

    /// Kind of the API failure, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClientError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Response that caused the failure, if the server answered at all.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ClientError::Api { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// Whether the failure came from a status the executor retries (429 or 5xx).
    ///
    /// Such errors only surface once the attempt budget is spent.
    pub fn is_retryable_status(&self) -> bool {
        matches!(self.kind(), Some(ErrorKind::TooManyRequests | ErrorKind::ServerError))
    }
}
