//! Page sequence engine
//!
//! Turns one request plus a list of pagination strategies into a lazy sequence
//! of items spanning many HTTP round-trips.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Paginator` - blocking `Iterator` over items (`Pages` over whole pages)
//! - `AsyncPaginator` - `Stream` over items (`AsyncPages` over whole pages)
//!
//! Both engines take an externally supplied executor that performs one call,
//! and an extractor that pulls the items out of a decoded page. The loop is:
//! strategy produces a request, executor fetches it, items are extracted, a new
//! context is built from the response, repeat.

mod stream;
mod sync;
mod types;

pub use stream::{AsyncPages, AsyncPaginator};
pub use sync::{Pages, Paginator};
