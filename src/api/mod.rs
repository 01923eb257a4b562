//! API call facade
//!
//! Binds a [`Transport`](crate::http::Transport), a request and its pagination
//! strategies. Generated SDK methods build an [`ApiCall`] and either execute it
//! once or stream its items across pages.
//!
//! # Example
//!
//! ```ignore
//! let call = ApiCall::new(client, RequestBuilder::get("/users").query_param("offset", 0))
//!     .with_strategy(PaginationStrategy::offset("$request.query#/offset"));
//!
//! let mut users = call.records("$response.body#/data")?;
//! while let Some(user) = users.next().await {
//!     println!("{}", user?);
//! }
//! ```

mod call;

pub use call::{
    records_extractor, ApiCall, Extractor, ItemStream, PageExecutor, PageFuture, PageStream,
    RecordStream,
};
