// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # SDK Runtime
//!
//! Shared runtime for generated API-client SDKs: builds requests, sends them and
//! turns one API call into a lazy sequence of items spanning many pages.
//!
//! ## Features
//!
//! - **Scoped pointers**: `$response.body#/meta/next` style addresses that read
//!   from responses and write into requests without knowing their shape
//! - **Generic pagination**: offset, cursor, page number and link strategies,
//!   several of which may be offered for one call
//! - **Sync and async engines**: an `Iterator` and a `Stream` over items or pages,
//!   with cancellation
//! - **HTTP transport**: retries, backoff and rate limiting on top of reqwest
//! - **YAML endpoints**: declarative endpoint definitions for the CLI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sdk_runtime::{ApiCall, HttpClient, HttpClientConfig, JsonValue, PaginationStrategy, RequestBuilder, Result};
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = HttpClient::with_config(
//!         HttpClientConfig::builder().base_url("https://api.example.com").build(),
//!     )?;
//!
//!     let request = RequestBuilder::get("/users").query_param("cursor", JsonValue::Null);
//!     let call = ApiCall::new(Arc::new(client), request)
//!         .with_strategy(PaginationStrategy::cursor(
//!             "$response.body#/meta/next_cursor",
//!             "$request.query#/cursor",
//!         ));
//!
//!     let mut users = Box::pin(call.records("$response.body#/data")?);
//!     while let Some(user) = users.next().await {
//!         println!("{}", user?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          ApiCall                                │
//! │   execute() → P      items() → Stream<T>     pages() → Page<T>  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────────┬─────────────┴──────────────┬───────────────────┐
//! │     Engine     │         Pagination         │       HTTP        │
//! ├────────────────┼────────────────────────────┼───────────────────┤
//! │ Paginator      │ Offset       Cursor        │ Transport         │
//! │ AsyncPaginator │ PageNumber   Link          │ Retry / Backoff   │
//! │ Cancellation   │ PaginationContext          │ Rate Limit        │
//! └────────────────┴────────────────────────────┴───────────────────┘
//!                                │
//! ┌───────────────────────────────┴─────────────────────────────────┐
//! │        Scoped pointers: resolve (response) / update (request)   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the runtime
pub mod error;

/// Common types and type aliases
pub mod types;

/// Scoped pointer addressing
pub mod pointer;

/// Request builder and reference-based updates
pub mod request;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Sync and async pagination engines
pub mod engine;

/// API call facade
pub mod api;

/// YAML loader for endpoint definitions
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::ApiCall;
pub use engine::{AsyncPaginator, Paginator};
pub use http::{HttpClient, HttpClientConfig, HttpResponse, Transport};
pub use loader::{load_endpoint, load_endpoint_from_str, EndpointDefinition};
pub use pagination::{Page, PageMetadata, PaginatedResult, PaginationContext, PaginationStrategy};
pub use pointer::{Resolution, ScopedPointer};
pub use request::RequestBuilder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
