//! Test doubles for the offer source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use offerdesk_shared::{NewOfferInput, OfferId, OfferRecord};

use crate::criteria::{QueryCriteria, QueryResult};
use crate::error::SourceError;
use crate::session::AccessToken;
use crate::source::{InMemoryOfferSource, OfferSource};

/// In-memory source with scripted per-query latency and failures.
///
/// Each query takes the next latency (zero once the script runs out) and the
/// next outcome: `Ok(())` delegates to the wrapped source, `Err` fails with
/// that error. Once outcomes run out, queries fail only while
/// [`fail_queries`](Self::fail_queries) is set. A page size cap stands in
/// for a server that serves smaller pages than requested. Mutations always
/// delegate.
pub struct ScriptedSource {
    inner: InMemoryOfferSource,
    latencies: Mutex<VecDeque<Duration>>,
    outcomes: Mutex<VecDeque<Result<(), SourceError>>>,
    page_size_cap: Option<usize>,
    fail_queries: AtomicBool,
    started: AtomicUsize,
    settled: AtomicUsize,
    seen: Mutex<Vec<(QueryCriteria, Option<AccessToken>)>>,
}

impl ScriptedSource {
    pub fn new(inner: InMemoryOfferSource) -> Self {
        Self {
            inner,
            latencies: Mutex::new(VecDeque::new()),
            outcomes: Mutex::new(VecDeque::new()),
            page_size_cap: None,
            fail_queries: AtomicBool::new(false),
            started: AtomicUsize::new(0),
            settled: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latencies(self, latencies: impl IntoIterator<Item = Duration>) -> Self {
        *self.latencies.lock().unwrap_or_else(PoisonError::into_inner) =
            latencies.into_iter().collect();
        self
    }

    pub fn with_outcomes(
        self,
        outcomes: impl IntoIterator<Item = Result<(), SourceError>>,
    ) -> Self {
        *self.outcomes.lock().unwrap_or_else(PoisonError::into_inner) =
            outcomes.into_iter().collect();
        self
    }

    pub fn with_page_size_cap(mut self, cap: usize) -> Self {
        self.page_size_cap = Some(cap);
        self
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Number of queries started.
    pub fn query_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of queries that have produced a response.
    pub fn settled_count(&self) -> usize {
        self.settled.load(Ordering::SeqCst)
    }

    /// Criteria of every query started, in order.
    pub fn queried_criteria(&self) -> Vec<QueryCriteria> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(criteria, _)| criteria.clone())
            .collect()
    }

    /// Token attached to every query started, in order.
    pub fn queried_tokens(&self) -> Vec<Option<AccessToken>> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, token)| token.clone())
            .collect()
    }
}

#[async_trait]
impl OfferSource for ScriptedSource {
    async fn query(
        &self,
        criteria: &QueryCriteria,
        token: Option<&AccessToken>,
    ) -> Result<QueryResult, SourceError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((criteria.clone(), token.cloned()));

        let latency = self
            .latencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default();
        let scripted = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut served = criteria.clone();
        if let Some(cap) = self.page_size_cap {
            served.page_size = served.page_size.min(cap);
        }

        let outcome = match scripted {
            Some(Err(e)) => Err(e),
            Some(Ok(())) => self.inner.query(&served, token).await,
            None if self.fail_queries.load(Ordering::SeqCst) => Err(SourceError::Api {
                status: 500,
                message: "Server error occurred".into(),
            }),
            None => self.inner.query(&served, token).await,
        };
        self.settled.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn get(
        &self,
        id: OfferId,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.inner.get(id, token).await
    }

    async fn create(
        &self,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.inner.create(offer, token).await
    }

    async fn update(
        &self,
        id: OfferId,
        offer: &NewOfferInput,
        token: Option<&AccessToken>,
    ) -> Result<OfferRecord, SourceError> {
        self.inner.update(id, offer, token).await
    }

    async fn remove(&self, id: OfferId, token: Option<&AccessToken>) -> Result<(), SourceError> {
        self.inner.remove(id, token).await
    }
}
