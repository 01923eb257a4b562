//! Async paginator
//!
//! A [`Stream`] over items that suspends while the executor's future is
//! pending. At most one fetch is in flight and pages are strictly ordered.

use super::types::Progress;
use crate::error::{Error, Result};
use crate::pagination::{Page, PaginatedResult, PaginationStrategy};
use crate::request::RequestBuilder;
use futures::future::BoxFuture;
use futures::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pin_project! {
    /// Lazy stream of items spanning many pages
    ///
    /// Same termination rules as [`Paginator`](super::Paginator). The
    /// cancellation token is checked before every fetch and watched while a
    /// fetch is in flight; cancelling drops the pending fetch and ends the
    /// stream with a single [`Error::Cancelled`].
    pub struct AsyncPaginator<P, T, E, X, Fut>
    where
        E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
        Fut: Future<Output = Result<PaginatedResult<P>>>,
        X: FnMut(&P) -> Option<Vec<T>>,
    {
        progress: Progress,
        executor: E,
        extractor: X,
        cancellation: CancellationToken,
        cancelled: Option<BoxFuture<'static, ()>>,
        in_flight: Option<(RequestBuilder, PaginationStrategy)>,
        buffer: VecDeque<T>,
        _page: PhantomData<fn() -> P>,
        #[pin]
        current_fetch: Option<Fut>,
    }
}

impl<P, T, E, X, Fut> AsyncPaginator<P, T, E, X, Fut>
where
    E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<P>>>,
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
            cancelled: None,
            in_flight: None,
            buffer: VecDeque::new(),
            _page: PhantomData,
            current_fetch: None,
        })
    }

    /// Watch `token`; the executor receives a clone of it as well
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        let watched = token.clone();
        self.cancelled = Some(Box::pin(async move { watched.cancelled().await }));
        self.cancellation = token;
        self
    }

    /// Number of non-empty pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.progress.pages_fetched()
    }

    /// Stream whole pages instead of items.
    ///
    /// Items already buffered from a partly consumed page are dropped.
    pub fn into_pages(self) -> AsyncPages<P, T, E, X, Fut> {
        AsyncPages { inner: self }
    }

    /// Poll for the next non-empty page
    pub fn poll_next_page(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Page<T>>>> {
        let mut this = self.project();

        loop {
            if let Some(fut) = this.current_fetch.as_mut().as_pin_mut() {
                if let Some(cancelled) = this.cancelled.as_mut() {
                    if cancelled.as_mut().poll(cx).is_ready() {
                        debug!("Pagination cancelled during fetch");
                        this.current_fetch.set(None);
                        *this.in_flight = None;
                        this.progress.finish();
                        return Poll::Ready(Some(Err(Error::Cancelled)));
                    }
                }

                let result = ready!(fut.poll(cx));
                this.current_fetch.set(None);

                let Some((request, strategy)) = this.in_flight.take() else {
                    this.progress.finish();
                    return Poll::Ready(None);
                };

                let result = match result {
                    Ok(result) => result,
                    Err(e) => {
                        this.progress.finish();
                        return Poll::Ready(Some(Err(e)));
                    }
                };

                let items = (this.extractor)(&result.page).unwrap_or_default();
                if items.is_empty() {
                    debug!("Empty page, pagination finished");
                    this.progress.finish();
                    return Poll::Ready(None);
                }

                this.progress
                    .record_page(request, &result.response, items.len());

                return Poll::Ready(Some(Ok(Page {
                    items,
                    metadata: strategy.metadata(),
                    response: result.response,
                })));
            }

            if this.progress.is_finished() {
                return Poll::Ready(None);
            }

            if this.cancellation.is_cancelled() {
                debug!("Pagination cancelled");
                this.progress.finish();
                return Poll::Ready(Some(Err(Error::Cancelled)));
            }

            let Some((request, strategy)) = this.progress.next_request() else {
                return Poll::Ready(None);
            };

            let fut = (this.executor)(request.clone(), strategy.clone(), this.cancellation.clone());
            *this.in_flight = Some((request, strategy));
            this.current_fetch.set(Some(fut));
        }
    }
}

impl<P, T, E, X, Fut> Stream for AsyncPaginator<P, T, E, X, Fut>
where
    E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<P>>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.as_mut().project().buffer.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            match ready!(self.as_mut().poll_next_page(cx)) {
                Some(Ok(page)) => self.as_mut().project().buffer.extend(page.items),
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => return Poll::Ready(None),
            }
        }
    }
}

pin_project! {
    /// Page-level view of an [`AsyncPaginator`]
    pub struct AsyncPages<P, T, E, X, Fut>
    where
        E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
        Fut: Future<Output = Result<PaginatedResult<P>>>,
        X: FnMut(&P) -> Option<Vec<T>>,
    {
        #[pin]
        inner: AsyncPaginator<P, T, E, X, Fut>,
    }
}

impl<P, T, E, X, Fut> AsyncPages<P, T, E, X, Fut>
where
    E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<P>>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    /// Number of non-empty pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.inner.pages_fetched()
    }
}

impl<P, T, E, X, Fut> Stream for AsyncPages<P, T, E, X, Fut>
where
    E: FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> Fut,
    Fut: Future<Output = Result<PaginatedResult<P>>>,
    X: FnMut(&P) -> Option<Vec<T>>,
{
    type Item = Result<Page<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next_page(cx)
    }
}
