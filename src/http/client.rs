//! HTTP client with retry and rate limiting
//!
//! Sends [`RequestBuilder`]s and buffers the response:
//! - Automatic retries with configurable backoff
//! - Rate limiting to prevent API throttling
//! - Status classification (4xx/5xx become [`Error::HttpStatus`])

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::response::HttpResponse;
use crate::error::{Error, Result};
use crate::request::{FormField, RequestBody, RequestBuilder};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Sends one request and returns the buffered response.
///
/// The pagination engine never calls a transport directly; executors built by
/// [`ApiCall`](crate::api::ApiCall) do.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request
    async fn send(&self, request: &RequestBuilder) -> Result<HttpResponse>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: BTreeMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: BTreeMap::new(),
            user_agent: format!("sdk-runtime/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Send a request and decode the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: &RequestBuilder) -> Result<T> {
        self.send(request).await?.json()
    }

    /// Resolve the full URL of a request against the configured base URL
    pub fn url_for(&self, request: &RequestBuilder) -> Result<Url> {
        request.build_url(self.config.base_url.as_deref().unwrap_or_default())
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Translate a request into a reqwest request for one attempt
    fn prepare(&self, request: &RequestBuilder, url: &Url) -> Result<reqwest::RequestBuilder> {
        let mut outgoing = self
            .client
            .request(request.method().into(), url.clone())
            .timeout(self.config.timeout);

        for (name, value) in &self.config.default_headers {
            outgoing = outgoing.header(name.as_str(), value.as_str());
        }
        for (name, value) in request.header_pairs() {
            outgoing = outgoing.header(name, value);
        }

        let outgoing = match request.body() {
            RequestBody::Empty => outgoing,
            RequestBody::Json(body) => outgoing.json(body),
            RequestBody::Form(fields) if has_files(fields) => {
                outgoing.multipart(multipart_form(request, fields)?)
            }
            RequestBody::Form(_) => outgoing.form(&request.form_pairs()),
            RequestBody::Binary(file) => {
                let outgoing = outgoing.body(file.content.clone());
                match &file.content_type {
                    Some(content_type) => outgoing.header(CONTENT_TYPE, content_type.as_str()),
                    None => outgoing,
                }
            }
        };

        Ok(outgoing)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &RequestBuilder) -> Result<HttpResponse> {
        let url = self.url_for(request)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        while attempt <= max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let outgoing = self.prepare(request, &url)?;

            let failure = match outgoing.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = extract_retry_after(&response);
                        if attempt >= max_retries {
                            return Err(Error::RateLimited {
                                retry_after_seconds: retry_after,
                            });
                        }
                        warn!(
                            "Rate limited (429), attempt {}/{}, waiting {}s",
                            attempt + 1,
                            max_retries + 1,
                            retry_after
                        );
                        tokio::time::sleep(Duration::from_secs(retry_after)).await;
                        attempt += 1;
                        continue;
                    }

                    if is_retryable_status(status) && attempt < max_retries {
                        Error::http_status(status.as_u16(), "")
                    } else if status.is_client_error() || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::http_status(status.as_u16(), body));
                    } else {
                        debug!("{} {} -> {}", request.method(), url, status.as_u16());
                        return HttpResponse::from_reqwest(response).await;
                    }
                }
                Err(e) if e.is_timeout() => Error::Timeout {
                    timeout_ms: self.timeout_ms(),
                },
                Err(e) if e.is_connect() => Error::Http(e),
                Err(e) => return Err(Error::Http(e)),
            };

            if attempt >= max_retries {
                return Err(failure);
            }

            let delay = self.calculate_backoff(attempt);
            warn!(
                "Request failed ({}), attempt {}/{}, retrying in {:?}",
                failure,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }

        Err(Error::MaxRetriesExceeded { max_retries })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn has_files(fields: &BTreeMap<String, FormField>) -> bool {
    fields
        .values()
        .any(|field| matches!(field, FormField::File(_)))
}

fn multipart_form(
    request: &RequestBuilder,
    fields: &BTreeMap<String, FormField>,
) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, value) in request.form_pairs() {
        form = form.text(name, value);
    }

    for (name, field) in fields {
        let FormField::File(file) = field else {
            continue;
        };
        let mut part = multipart::Part::bytes(file.content.to_vec());
        if let Some(file_name) = &file.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part(name.clone(), part);
    }

    Ok(form)
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status.as_u16(),
        500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Extract retry-after header value
fn extract_retry_after(response: &reqwest::Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
