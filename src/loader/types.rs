//! Loader types
//!
//! Declarative endpoint definition types for YAML parsing.

use crate::api::ApiCall;
use crate::error::Result;
use crate::http::{HttpClientConfig, RateLimiterConfig, Transport};
use crate::pagination::PaginationStrategy;
use crate::pointer::Scope;
use crate::request::RequestBuilder;
use crate::types::{BackoffType, JsonValue, Method, ParamMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Endpoint Definition
// ============================================================================

/// Top-level endpoint definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EndpointDefinition {
    /// Endpoint name
    pub name: String,
    /// Base URL for all requests
    pub base_url: String,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpDefinition,
    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Initial request
    pub request: RequestDefinition,
    /// `$response.body` address of the record array in each page
    #[serde(default)]
    pub records: Option<String>,
    /// Pagination strategies, tried in order
    #[serde(default)]
    pub pagination: Vec<PaginationDefinition>,
}

impl EndpointDefinition {
    /// HTTP client configuration for this endpoint
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            );

        builder = match self.http.rate_limit_rps {
            Some(rps) => builder.rate_limit(RateLimiterConfig::new(rps, rps)),
            None => builder.no_rate_limit(),
        };

        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }

        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        builder.build()
    }

    /// Pagination strategies in declaration order
    pub fn strategies(&self) -> Vec<PaginationStrategy> {
        self.pagination
            .iter()
            .map(PaginationDefinition::to_strategy)
            .collect()
    }

    /// Bind the endpoint to a transport
    pub fn api_call(&self, transport: Arc<dyn Transport>) -> Result<ApiCall> {
        Ok(ApiCall::new(transport, self.request.to_request()?).with_strategies(self.strategies()))
    }
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Backoff between retries
    #[serde(default)]
    pub backoff: BackoffType,
    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Rate limit (requests per second)
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,
    /// User agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_initial_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    60_000
}

// ============================================================================
// Request Definition
// ============================================================================

/// Initial request of an endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RequestDefinition {
    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,
    /// Path template, e.g. `/orgs/{org}/members`
    pub path: String,
    /// Path-template parameters
    #[serde(default)]
    pub template: ParamMap,
    /// Query parameters
    #[serde(default)]
    pub query: ParamMap,
    /// Request headers
    #[serde(default)]
    pub headers: ParamMap,
    /// JSON body
    #[serde(default)]
    pub body: Option<JsonValue>,
    /// Form fields (url-encoded body)
    #[serde(default)]
    pub form: ParamMap,
}

impl RequestDefinition {
    /// Build the initial request
    pub fn to_request(&self) -> Result<RequestBuilder> {
        let method: Method = self.method.parse()?;
        let mut request = RequestBuilder::new(method, &self.path);

        for (name, value) in &self.template {
            request = request.template_param(name, value.clone());
        }
        for (name, value) in &self.query {
            request = request.query_param(name, value.clone());
        }
        for (name, value) in &self.headers {
            request = request.header(name, value.clone());
        }
        if let Some(body) = &self.body {
            request = request.json_body(body.clone());
        }
        for (name, value) in &self.form {
            request = request.form_param(name, value.clone());
        }

        Ok(request)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

// ============================================================================
// Pagination Definition
// ============================================================================

/// Pagination strategy definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationDefinition {
    /// Offset advanced by the previous page's item count
    Offset {
        /// Request address of the offset
        input: String,
    },
    /// Cursor copied from the response into the request
    Cursor {
        /// Response address of the next cursor
        output: String,
        /// Request address of the cursor
        input: String,
    },
    /// Page number incremented by one
    PageNumber {
        /// Request address of the page number
        input: String,
    },
    /// Next-page link whose query replaces request parameters
    Link {
        /// Response address of the next link
        next: String,
    },
}

impl PaginationDefinition {
    /// Runtime strategy for this definition
    pub fn to_strategy(&self) -> PaginationStrategy {
        match self {
            Self::Offset { input } => PaginationStrategy::offset(input),
            Self::Cursor { output, input } => PaginationStrategy::cursor(output, input),
            Self::PageNumber { input } => PaginationStrategy::page_number(input),
            Self::Link { next } => PaginationStrategy::link(next),
        }
    }

    /// Addresses with their field name and whether they must be request-side
    pub(crate) fn addresses(&self) -> Vec<(&'static str, &str, Side)> {
        match self {
            Self::Offset { input } | Self::PageNumber { input } => {
                vec![("input", input.as_str(), Side::Request)]
            }
            Self::Cursor { output, input } => vec![
                ("output", output.as_str(), Side::Response),
                ("input", input.as_str(), Side::Request),
            ],
            Self::Link { next } => vec![("next", next.as_str(), Side::Response)],
        }
    }
}

/// Which half of an exchange an address must point into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Request,
    Response,
}

impl Side {
    pub(crate) fn admits(self, scope: Scope) -> bool {
        match self {
            Side::Request => scope.is_request(),
            Side::Response => scope.is_response(),
        }
    }
}
