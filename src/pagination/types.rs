//! Pagination types
//!
//! The per-iteration context handed to strategies, the page value produced by
//! executors, and the metadata attached to each yielded page.

use crate::http::HttpResponse;
use crate::pointer;
use crate::request::RequestBuilder;
use serde::Serialize;

/// Snapshot of one pagination step
///
/// Before the first request there is no response; after every fetched page a
/// fresh context carries the request that produced it, the response body and
/// headers (headers serialized as a JSON object) and the page's item count.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationContext {
    request: RequestBuilder,
    has_response: bool,
    response_body: Option<String>,
    response_headers: Option<String>,
    previous_page_item_count: usize,
}

impl PaginationContext {
    /// Context for the very first request
    pub fn initial(request: RequestBuilder) -> Self {
        Self {
            request,
            has_response: false,
            response_body: None,
            response_headers: None,
            previous_page_item_count: 0,
        }
    }

    /// Context after a page was fetched
    pub fn new(
        request: RequestBuilder,
        response_body: Option<String>,
        response_headers: Option<String>,
        previous_page_item_count: usize,
    ) -> Self {
        Self {
            request,
            has_response: true,
            response_body,
            response_headers,
            previous_page_item_count,
        }
    }

    /// Context after a page was fetched, taken from the buffered response
    pub fn from_response(
        request: RequestBuilder,
        response: &HttpResponse,
        previous_page_item_count: usize,
    ) -> Self {
        Self::new(
            request,
            Some(response.text().into_owned()),
            Some(response.headers_json()),
            previous_page_item_count,
        )
    }

    /// Request that produced the previous page (or the initial request)
    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// Whether a page has been fetched yet
    pub fn has_response(&self) -> bool {
        self.has_response
    }

    /// Previous response body
    pub fn response_body(&self) -> Option<&str> {
        self.response_body.as_deref()
    }

    /// Previous response headers as a JSON object
    pub fn response_headers(&self) -> Option<&str> {
        self.response_headers.as_deref()
    }

    /// Number of items on the previous page
    pub fn previous_page_item_count(&self) -> usize {
        self.previous_page_item_count
    }

    /// Resolve a response-side address against the previous response
    pub fn resolve(&self, address: &str) -> Option<String> {
        pointer::resolve(address, self.response_body(), self.response_headers())
    }
}

/// One fetched page as returned by an executor
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<P> {
    /// The buffered response
    pub response: HttpResponse,
    /// The decoded page
    pub page: P,
}

impl<P> PaginatedResult<P> {
    /// Pair a response with its decoded page
    pub fn new(response: HttpResponse, page: P) -> Self {
        Self { response, page }
    }
}

/// Strategy state that requested a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageMetadata {
    /// Offset of the first item on the page
    Offset { offset: i64 },
    /// Cursor sent with the request, if any
    Cursor { cursor: Option<String> },
    /// Page number sent with the request
    PageNumber { page: i64 },
    /// Link followed to reach the page, `None` for the first page
    Link { link: Option<String> },
}

/// A page of items with its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items extracted from the page
    pub items: Vec<T>,
    /// State of the strategy that requested the page
    pub metadata: PageMetadata,
    /// The buffered response
    pub response: HttpResponse,
}

impl<T> Page<T> {
    /// Number of items on the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
