//! One API call, single-shot or paginated

use crate::engine::{AsyncPages, AsyncPaginator};
use crate::error::{Error, Result};
use crate::http::{HttpResponse, Transport};
use crate::pagination::{PaginatedResult, PaginationStrategy};
use crate::pointer::{Scope, ScopedPointer};
use crate::request::RequestBuilder;
use crate::types::JsonValue;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Future returned by a page executor
pub type PageFuture<P> = BoxFuture<'static, Result<PaginatedResult<P>>>;

/// Page executor backed by a transport
pub type PageExecutor<P> =
    Box<dyn FnMut(RequestBuilder, PaginationStrategy, CancellationToken) -> PageFuture<P> + Send>;

/// Boxed item extractor
pub type Extractor<P, T> = Box<dyn FnMut(&P) -> Option<Vec<T>> + Send>;

/// Item stream of an [`ApiCall`]
pub type ItemStream<P, T, X> = AsyncPaginator<P, T, PageExecutor<P>, X, PageFuture<P>>;

/// Page stream of an [`ApiCall`]
pub type PageStream<P, T, X> = AsyncPages<P, T, PageExecutor<P>, X, PageFuture<P>>;

/// JSON records pulled out of each page by pointer
pub type RecordStream = ItemStream<JsonValue, JsonValue, Extractor<JsonValue, JsonValue>>;

/// A request bound to a transport and its pagination strategies
#[derive(Clone)]
pub struct ApiCall {
    transport: Arc<dyn Transport>,
    request: RequestBuilder,
    strategies: Vec<PaginationStrategy>,
    cancellation: CancellationToken,
}

impl ApiCall {
    /// Create a call without pagination
    pub fn new(transport: Arc<dyn Transport>, request: RequestBuilder) -> Self {
        Self {
            transport,
            request,
            strategies: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Add a pagination strategy; earlier strategies take precedence
    #[must_use]
    pub fn with_strategy(mut self, strategy: PaginationStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Add several pagination strategies in order
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = PaginationStrategy>) -> Self {
        self.strategies.extend(strategies);
        self
    }

    /// Cancel streams created from this call with `token`
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The initial request
    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// Configured pagination strategies
    pub fn strategies(&self) -> &[PaginationStrategy] {
        &self.strategies
    }

    /// Send the initial request once
    pub async fn send(&self) -> Result<HttpResponse> {
        self.transport.send(&self.request).await
    }

    /// Send the initial request once and decode the JSON body
    pub async fn execute<P: DeserializeOwned>(&self) -> Result<P> {
        self.send().await?.json()
    }

    /// Stream items across pages.
    ///
    /// Every page body is decoded into `P` and handed to `extractor`.
    pub fn items<P, T, X>(&self, extractor: X) -> Result<ItemStream<P, T, X>>
    where
        P: DeserializeOwned + Send + 'static,
        X: FnMut(&P) -> Option<Vec<T>>,
    {
        Ok(AsyncPaginator::new(
            self.request.clone(),
            self.strategies.clone(),
            self.executor(),
            extractor,
        )?
        .with_cancellation(self.cancellation.clone()))
    }

    /// Stream whole pages with their pagination metadata
    pub fn pages<P, T, X>(&self, extractor: X) -> Result<PageStream<P, T, X>>
    where
        P: DeserializeOwned + Send + 'static,
        X: FnMut(&P) -> Option<Vec<T>>,
    {
        Ok(self.items(extractor)?.into_pages())
    }

    /// Stream the elements of the JSON array found at a `$response.body` address.
    ///
    /// A page whose body has no array at the address counts as empty and ends
    /// the stream.
    pub fn records(&self, address: &str) -> Result<RecordStream> {
        self.items(records_extractor(Some(address))?)
    }

    /// Build an executor that sends through the transport and decodes into `P`
    fn executor<P>(&self) -> PageExecutor<P>
    where
        P: DeserializeOwned + Send + 'static,
    {
        let transport = Arc::clone(&self.transport);
        Box::new(
            move |request: RequestBuilder,
                  strategy: PaginationStrategy,
                  token: CancellationToken|
                  -> PageFuture<P> {
                let transport = Arc::clone(&transport);
                Box::pin(async move {
                    debug!("Requesting {} ({} pagination)", request.path(), strategy.kind());
                    let response = tokio::select! {
                        () = token.cancelled() => return Err(Error::Cancelled),
                        response = transport.send(&request) => response?,
                    };
                    let page = response.json::<P>()?;
                    Ok(PaginatedResult::new(response, page))
                })
            },
        )
    }
}

impl std::fmt::Debug for ApiCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCall")
            .field("request", &self.request)
            .field("strategies", &self.strategies)
            .finish_non_exhaustive()
    }
}

/// Extractor for the JSON array at a `$response.body` address, or for the
/// body itself when no address is given
pub fn records_extractor(address: Option<&str>) -> Result<Extractor<JsonValue, JsonValue>> {
    let Some(address) = address else {
        return Ok(Box::new(|body: &JsonValue| body.as_array().cloned()));
    };

    let pointer =
        ScopedPointer::parse(address).map_err(|e| Error::invalid_value("records", e.to_string()))?;
    if pointer.scope() != Scope::ResponseBody {
        return Err(Error::invalid_value(
            "records",
            format!("expected a {} address, got {}", Scope::ResponseBody, pointer.scope()),
        ));
    }

    let path = pointer.path().to_string();
    Ok(Box::new(move |body: &JsonValue| records_at(body, &path)))
}

/// Clone the array found at `path`, `None` when there is none
fn records_at(body: &JsonValue, path: &str) -> Option<Vec<JsonValue>> {
    body.pointer(path)?.as_array().cloned()
}
