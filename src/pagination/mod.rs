//! Pagination module
//!
//! Supports: Offset, Cursor, Page Number, Link
//!
//! # Overview
//!
//! Strategies never know the concrete request or response shape of an
//! endpoint. Each one is configured with scoped pointer addresses
//! (`$request.query#/offset`, `$response.body#/meta/next_cursor`, ...) and
//! rewrites the previous request through them.

mod strategies;
mod types;

pub use strategies::{
    CursorPagination, LinkPagination, OffsetPagination, PageNumberPagination, PaginationStrategy,
};
pub use types::{Page, PageMetadata, PaginatedResult, PaginationContext};
