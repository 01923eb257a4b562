//! Pagination strategy implementations
//!
//! Every strategy turns a [`PaginationContext`] into the next request. The first
//! call (no response yet) records the strategy's starting state and returns the
//! request unchanged; later calls derive the next request from the previous
//! one. `None` means the strategy cannot continue.
//!
//! Strategies are values: `apply` returns the updated strategy next to the
//! request instead of mutating in place.

use super::types::{PageMetadata, PaginationContext};
use crate::pointer::node_text;
use crate::request::RequestBuilder;
use crate::types::{JsonValue, OptionStringExt, ParamMap};
use std::collections::btree_map::Entry;
use url::form_urlencoded;

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination (`?offset=100&limit=50`)
///
/// The offset advances by the number of items on the previous page. An offset
/// that would overflow `i64` makes the strategy inapplicable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPagination {
    /// Request address of the offset value
    pub input: String,
    offset: i64,
}

impl OffsetPagination {
    /// Create an offset strategy writing to `input`
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            offset: 0,
        }
    }

    /// Offset of the most recent request
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Compute the next request
    pub fn apply(&self, context: &PaginationContext) -> Option<(RequestBuilder, Self)> {
        let request = context.request();

        if !context.has_response() {
            let offset = read_integer(request, &self.input).unwrap_or(0);
            return Some((request.clone(), self.with_offset(offset)));
        }

        let count = i64::try_from(context.previous_page_item_count()).ok()?;
        let offset = self.offset.checked_add(count)?;
        let next = request
            .update_by_reference(&self.input, |_| Some(JsonValue::from(offset)))
            .ok()?;
        Some((next, self.with_offset(offset)))
    }

    fn with_offset(&self, offset: i64) -> Self {
        Self {
            input: self.input.clone(),
            offset,
        }
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (`?starting_after=obj_123`)
///
/// Reads the next cursor from the response and stops when it stops changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPagination {
    /// Response address of the next cursor
    pub output: String,
    /// Request address of the cursor value
    pub input: String,
    cursor: Option<String>,
}

impl CursorPagination {
    /// Create a cursor strategy
    pub fn new(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            input: input.into(),
            cursor: None,
        }
    }

    /// Cursor of the most recent request
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Compute the next request
    pub fn apply(&self, context: &PaginationContext) -> Option<(RequestBuilder, Self)> {
        let request = context.request();

        if !context.has_response() {
            let cursor = request
                .value_by_reference(&self.input)
                .ok()
                .and_then(|value| node_text(&value));
            return Some((request.clone(), self.with_cursor(cursor)));
        }

        let next = context
            .resolve(&self.output)
            .or_else(|| self.cursor.clone());
        if next == self.cursor {
            return None;
        }
        let cursor = next?;

        let updated = request
            .update_by_reference(&self.input, |_| Some(JsonValue::String(cursor.clone())))
            .ok()?;
        Some((updated, self.with_cursor(Some(cursor))))
    }

    fn with_cursor(&self, cursor: Option<String>) -> Self {
        Self {
            output: self.output.clone(),
            input: self.input.clone(),
            cursor,
        }
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination (`?page=2`)
///
/// Never stops on its own; the engine ends the sequence on an empty page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumberPagination {
    /// Request address of the page number
    pub input: String,
    page: i64,
}

impl PageNumberPagination {
    /// Create a page number strategy writing to `input`
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            page: 1,
        }
    }

    /// Page number of the most recent request
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Compute the next request
    pub fn apply(&self, context: &PaginationContext) -> Option<(RequestBuilder, Self)> {
        let request = context.request();

        if !context.has_response() {
            let page = read_integer(request, &self.input).unwrap_or(1);
            return Some((request.clone(), self.with_page(page)));
        }

        let page = self.page.checked_add(1)?;
        let next = request
            .update_by_reference(&self.input, |_| Some(JsonValue::from(page)))
            .ok()?;
        Some((next, self.with_page(page)))
    }

    fn with_page(&self, page: i64) -> Self {
        Self {
            input: self.input.clone(),
            page,
        }
    }
}

// ============================================================================
// Link Pagination
// ============================================================================

/// Link pagination (next URL in the body or an RFC 5988 `Link` header)
///
/// The query string of the next link is copied onto the request; the path of
/// the request is kept.
///
/// Besides an empty or absent link, a link equal to the one that produced the
/// current page also ends the sequence. This goes beyond the plain
/// "stop on empty" rule so a server echoing its own URL cannot loop forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPagination {
    /// Response address of the next link
    pub next: String,
    link: Option<String>,
}

impl LinkPagination {
    /// Create a link strategy
    pub fn new(next: impl Into<String>) -> Self {
        Self {
            next: next.into(),
            link: None,
        }
    }

    /// Link followed by the most recent request
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Compute the next request
    pub fn apply(&self, context: &PaginationContext) -> Option<(RequestBuilder, Self)> {
        let request = context.request();

        if !context.has_response() {
            return Some((request.clone(), self.with_link(None)));
        }

        let resolved = context.resolve(&self.next).none_if_empty()?;
        let link = link_target(&resolved)?;
        if self.link.as_deref() == Some(link.as_str()) {
            return None;
        }

        let next = request.with_query_parameters(link_query(&link));
        Some((next, self.with_link(Some(link))))
    }

    fn with_link(&self, link: Option<String>) -> Self {
        Self {
            next: self.next.clone(),
            link,
        }
    }
}

/// Pick the target URL out of a link value
///
/// Plain URLs are returned as-is; RFC 5988 values
/// (`<url>; rel="next", <url>; rel="prev"`) yield the `rel="next"` target.
fn link_target(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.starts_with('<') {
        return Some(value.to_string());
    }

    for part in value.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rel = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        match (url, rel) {
            (Some(url), Some(rel)) if rel.split_whitespace().any(|r| r == "next") => {
                return Some(url.to_string());
            }
            (Some(url), None) => return Some(url.to_string()),
            _ => {}
        }
    }

    None
}

/// Parse the query string of a URL; repeated keys become arrays
fn link_query(link: &str) -> ParamMap {
    let query = link
        .split_once('?')
        .map_or("", |(_, query)| query.split('#').next().unwrap_or(query));

    let mut params = ParamMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = JsonValue::String(value.into_owned());
        match params.entry(key.into_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                JsonValue::Array(values) => values.push(value),
                existing => {
                    let first = existing.take();
                    *existing = JsonValue::Array(vec![first, value]);
                }
            },
        }
    }
    params
}

/// Read an integer from the request; numeric strings are accepted
///
/// Floats count only when integral and inside the `i64` range.
fn read_integer(request: &RequestBuilder, address: &str) -> Option<i64> {
    match request.value_by_reference(address).ok()? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float_integer)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_integer(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

// ============================================================================
// Strategy Enum
// ============================================================================

/// One of the supported pagination protocols
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationStrategy {
    Offset(OffsetPagination),
    Cursor(CursorPagination),
    PageNumber(PageNumberPagination),
    Link(LinkPagination),
}

impl PaginationStrategy {
    /// Offset strategy, e.g. `offset("$request.query#/offset")`
    pub fn offset(input: impl Into<String>) -> Self {
        Self::Offset(OffsetPagination::new(input))
    }

    /// Cursor strategy, e.g.
    /// `cursor("$response.body#/meta/next", "$request.query#/cursor")`
    pub fn cursor(output: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Cursor(CursorPagination::new(output, input))
    }

    /// Page number strategy, e.g. `page_number("$request.query#/page")`
    pub fn page_number(input: impl Into<String>) -> Self {
        Self::PageNumber(PageNumberPagination::new(input))
    }

    /// Link strategy, e.g. `link("$response.body#/links/next")`
    pub fn link(next: impl Into<String>) -> Self {
        Self::Link(LinkPagination::new(next))
    }

    /// Compute the next request and the updated strategy, or `None` when
    /// this strategy cannot continue
    pub fn apply(&self, context: &PaginationContext) -> Option<(RequestBuilder, Self)> {
        match self {
            Self::Offset(s) => s.apply(context).map(|(r, s)| (r, Self::Offset(s))),
            Self::Cursor(s) => s.apply(context).map(|(r, s)| (r, Self::Cursor(s))),
            Self::PageNumber(s) => s.apply(context).map(|(r, s)| (r, Self::PageNumber(s))),
            Self::Link(s) => s.apply(context).map(|(r, s)| (r, Self::Link(s))),
        }
    }

    /// Current strategy state as page metadata
    pub fn metadata(&self) -> PageMetadata {
        match self {
            Self::Offset(s) => PageMetadata::Offset { offset: s.offset },
            Self::Cursor(s) => PageMetadata::Cursor {
                cursor: s.cursor.clone(),
            },
            Self::PageNumber(s) => PageMetadata::PageNumber { page: s.page },
            Self::Link(s) => PageMetadata::Link {
                link: s.link.clone(),
            },
        }
    }

    /// Short name of the protocol
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offset(_) => "offset",
            Self::Cursor(_) => "cursor",
            Self::PageNumber(_) => "page_number",
            Self::Link(_) => "link",
        }
    }
}
