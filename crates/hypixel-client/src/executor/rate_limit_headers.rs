use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{ClientError, ErrorKind};
use crate::types::ApiResponse;

pub const RATELIMIT_REMAINING: &str = "ratelimit-remaining";
pub const RATELIMIT_RESET: &str = "ratelimit-reset";
pub const RETRY_AFTER: &str = "retry-after";

/// Rate-limit headers read from a single response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHints {
    /// Requests left in the current window; 0 when the header is missing.
    pub remaining: u64,
    /// Seconds until the window resets (`ratelimit-reset`, else `retry-after`).
    pub reset_after: u64,
    /// Raw `retry-after`, authoritative for 429 responses.
    pub retry_after: Option<u64>,
}

impl RateLimitHints {
    pub fn from_response(response: &ApiResponse) -> Result<Self, ClientError> {
        let remaining = response.header_u64(RATELIMIT_REMAINING).unwrap_or(0);
        let retry_after = response.header_u64(RETRY_AFTER);
        let reset_after = response
            .header_u64(RATELIMIT_RESET)
            .or(retry_after)
            .ok_or(ClientError::MissingRateLimitHeaders { status: response.status().as_u16() })?;

        Ok(Self { remaining, reset_after, retry_after })
    }

    /// Cool-down for a non-429 response: wait out the window once the quota is spent.
    pub fn cooldown(&self, status: StatusCode) -> Duration {
        if self.remaining == 0 && status != StatusCode::TOO_MANY_REQUESTS {
            Duration::from_secs(self.reset_after)
        } else {
            Duration::ZERO
        }
    }

    /// Cool-down after a 429.
    pub fn retry_after(&self) -> Duration {
        Duration::from_secs(self.retry_after.unwrap_or(self.reset_after))
    }
}

/// What a single attempt means for the retry loop, with the delay to release the gate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { cooldown: Duration },
    Retry { cooldown: Duration },
    Terminal { kind: ErrorKind, cooldown: Duration },
}

impl AttemptOutcome {
    pub fn cooldown(&self) -> Duration {
        match self {
            AttemptOutcome::Success { cooldown }
            | AttemptOutcome::Retry { cooldown }
            | AttemptOutcome::Terminal { cooldown, .. } => *cooldown,
        }
    }
}

/// Back-off after a 5xx on the given 0-indexed attempt: 1s, 3s, 5s, ...
pub fn server_error_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 + u64::from(attempt) * 2)
}

pub fn classify(status: StatusCode, hints: &RateLimitHints, attempt: u32) -> AttemptOutcome {
    if status.is_success() {
        AttemptOutcome::Success { cooldown: hints.cooldown(status) }
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        AttemptOutcome::Retry { cooldown: hints.retry_after() }
    } else if status.is_server_error() {
        AttemptOutcome::Retry { cooldown: server_error_backoff(attempt) }
    } else {
        AttemptOutcome::Terminal {
            kind: ErrorKind::from_status(status.as_u16()),
            cooldown: hints.cooldown(status),
        }
    }
}
