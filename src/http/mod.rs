//! HTTP module
//!
//! Default transport for API calls.
//!
//! # Features
//!
//! - **Transport trait**: the seam between API calls and the network
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Buffered responses**: status, headers and body kept together for decoding
//!   and pagination

mod client;
mod rate_limit;
mod response;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, Transport};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::HttpResponse;

#[cfg(test)]
mod tests;
