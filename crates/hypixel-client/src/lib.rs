//! Client for the Hypixel public API.
//!
//! Every request goes through one shared rate-limit gate and a retrying
//! executor that honors the server's `ratelimit-*` and `retry-after` headers.
//!
//! ```no_run
//! # async fn run() -> Result<(), hypixel_client::ClientError> {
//! let client = hypixel_client::HypixelClient::new("your-api-key")?;
//! let key = client.get_key_info().await?;
//! println!("{} queries in the last minute", key.queries_in_past_minute);
//! client.close();
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod executor;
pub mod rate_limiter;
pub mod transport;
mod types;

pub use client::HypixelClient;
pub use error::{ClientError, ErrorKind};
pub use executor::HttpClient;
pub use rate_limiter::RateLimiter;
pub use transport::{ReqwestTransport, Transport};
pub use types::*;
