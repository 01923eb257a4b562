//! Blocking paginator
//!
//! Pull-based: every call to `next` fetches at most one page.

use super::types::Progress;
use crate::error::{Error, Result};
use crate::pagination::{Page, PaginatedResult, PaginationStrategy};
use crate::request::RequestBuilder;
use std::collections::VecDeque;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lazy sequence of items spanning many pages
///
/// The executor performs one call for a request; the extractor pulls the items
/// out of a decoded page (`None` counts as an empty page). The sequence ends
/// when the active strategy cannot continue, a page has no items, or the
/// executor fails (the error is yielded once).
pub struct Paginator<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    progress: Progress,
    executor: E,
    extractor: X,
    cancellation: CancellationToken,
    buffer: VecDeque<T>,
    _page: PhantomData<fn() -> P>,
}

impl<P, T, E, X> Paginator<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    /// Create a paginator; fails when `strategies` is empty
    pub fn new(
        request: RequestBuilder,
        strategies: Vec<PaginationStrategy>,
        executor: E,
        extractor: X,
    ) -> Result<Self> {
        Ok(Self {
            progress: Progress::new(request, strategies)?,
            executor,
            extractor,
            cancellation: CancellationToken::new(),
            buffer: VecDeque::new(),
            _page: PhantomData,
        })
    }

    /// Stop before the next fetch once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Number of non-empty pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.progress.pages_fetched()
    }

    /// Iterate over whole pages instead of items.
    ///
    /// Items already buffered from a partly consumed page are dropped.
    pub fn into_pages(self) -> Pages<P, T, E, X> {
        Pages { inner: self }
    }

    /// Fetch the next non-empty page
    pub fn next_page(&mut self) -> Option<Result<Page<T>>> {
        if self.progress.is_finished() {
            return None;
        }

        if self.cancellation.is_cancelled() {
            debug!("Pagination cancelled");
            self.progress.finish();
            return Some(Err(Error::Cancelled));
        }

        let (request, strategy) = self.progress.next_request()?;

        let result = match (self.executor)(&request, &strategy, &self.cancellation) {
            Ok(result) => result,
            Err(e) => {
                self.progress.finish();
                return Some(Err(e));
            }
        };

        let items = (self.extractor)(&result.page).unwrap_or_default();
        if items.is_empty() {
            debug!("Empty page, pagination finished");
            self.progress.finish();
            return None;
        }

        self.progress
            .record_page(request, &result.response, items.len());

        Some(Ok(Page {
            items,
            metadata: strategy.metadata(),
            response: result.response,
        }))
    }
}

impl<P, T, E, X> Iterator for Paginator<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            match self.next_page()? {
                Ok(page) => self.buffer.extend(page.items),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<P, T, E, X> std::fmt::Debug for Paginator<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("progress", &self.progress)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Page-level view of a [`Paginator`]
pub struct Pages<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    inner: Paginator<P, T, E, X>,
}

impl<P, T, E, X> Pages<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    /// Number of non-empty pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.inner.pages_fetched()
    }
}

impl<P, T, E, X> Iterator for Pages<P, T, E, X>
where
    E: FnMut(&RequestBuilder, &PaginationStrategy, &CancellationToken) -> Result<PaginatedResult<P>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    type Item = Result<Page<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_page()
    }
}
