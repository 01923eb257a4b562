//! Engine state shared by the sync and async paginators
//!
//! Strategy selection runs in three phases:
//! 1. the first request initializes every strategy against the initial
//!    context and uses the request of the first applicable one
//! 2. after the first page each strategy is probed in declaration order and
//!    the first one that applies is adopted
//! 3. the adopted strategy alone drives every remaining page

use crate::error::{Error, Result};
use crate::http::HttpResponse;
use crate::pagination::{PaginationContext, PaginationStrategy};
use crate::request::RequestBuilder;
use tracing::debug;

#[derive(Debug)]
enum Phase {
    Start(Vec<PaginationStrategy>),
    Probing(Vec<PaginationStrategy>),
    Committed(PaginationStrategy),
    Finished,
}

/// Strategy selection plus the context of the last fetched page
#[derive(Debug)]
pub(crate) struct Progress {
    phase: Phase,
    context: PaginationContext,
    pages_fetched: usize,
}

impl Progress {
    /// Fails when no strategy is given
    pub(crate) fn new(request: RequestBuilder, strategies: Vec<PaginationStrategy>) -> Result<Self> {
        if strategies.is_empty() {
            return Err(Error::MissingPaginationStrategy);
        }

        Ok(Self {
            phase: Phase::Start(strategies),
            context: PaginationContext::initial(request),
            pages_fetched: 0,
        })
    }

    pub(crate) fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    pub(crate) fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub(crate) fn finish(&mut self) {
        self.phase = Phase::Finished;
    }

    /// Request for the next page and the strategy state that produced it
    pub(crate) fn next_request(&mut self) -> Option<(RequestBuilder, PaginationStrategy)> {
        let phase = std::mem::replace(&mut self.phase, Phase::Finished);

        let next = match phase {
            Phase::Start(strategies) => self.initialize(strategies),
            Phase::Probing(strategies) => self.probe(strategies),
            Phase::Committed(strategy) => {
                let next = strategy.apply(&self.context);
                if next.is_none() {
                    debug!("{} pagination finished", strategy.kind());
                }
                next.map(|(request, strategy)| {
                    self.phase = Phase::Committed(strategy.clone());
                    (request, strategy)
                })
            }
            Phase::Finished => None,
        };

        if next.is_none() {
            self.phase = Phase::Finished;
        }
        next
    }

    /// Record a fetched, non-empty page
    pub(crate) fn record_page(
        &mut self,
        request: RequestBuilder,
        response: &HttpResponse,
        item_count: usize,
    ) {
        self.pages_fetched += 1;
        debug!(
            "Fetched page {} with {} items",
            self.pages_fetched, item_count
        );
        self.context = PaginationContext::from_response(request, response, item_count);
    }

    fn initialize(
        &mut self,
        strategies: Vec<PaginationStrategy>,
    ) -> Option<(RequestBuilder, PaginationStrategy)> {
        let mut first = None;
        let mut initialized = Vec::with_capacity(strategies.len());

        for strategy in strategies {
            match strategy.apply(&self.context) {
                Some((request, strategy)) => {
                    if first.is_none() {
                        first = Some((request, strategy.clone()));
                    }
                    initialized.push(strategy);
                }
                None => initialized.push(strategy),
            }
        }

        if first.is_none() {
            debug!("No pagination strategy applies to the first request");
        } else {
            self.phase = Phase::Probing(initialized);
        }
        first
    }

    fn probe(
        &mut self,
        strategies: Vec<PaginationStrategy>,
    ) -> Option<(RequestBuilder, PaginationStrategy)> {
        for strategy in strategies {
            if let Some((request, strategy)) = strategy.apply(&self.context) {
                debug!("Adopted {} pagination", strategy.kind());
                self.phase = Phase::Committed(strategy.clone());
                return Some((request, strategy));
            }
        }

        debug!("No pagination strategy applies after the first page");
        None
    }
}
