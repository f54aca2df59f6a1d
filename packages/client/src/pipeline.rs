//! Offer list query pipeline.
//!
//! [`OfferQueryPipeline`] owns the search, filter and page state of one offer
//! list view. Every committed change issues a query to the [`OfferSource`] in
//! a spawned task; responses are applied only if no later query was issued in
//! the meantime, so the visible result always belongs to the most recent
//! request.
//!
//! State is published through a [`tokio::sync::watch`] channel. The pipeline
//! must be used from within a tokio runtime.

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, warn};

use offerdesk_shared::{OfferId, OfferRecord, OfferStatus, OfferType};

use crate::config::ClientConfig;
use crate::criteria::{QueryCriteria, QueryResult};
use crate::debounce::Debouncer;
use crate::error::{MutationError, SourceError};
use crate::forms::OfferForm;
use crate::session::AuthProvider;
use crate::source::OfferSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Snapshot of a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    /// Committed criteria; the last query issued used exactly these.
    pub criteria: QueryCriteria,
    /// Search box text, not yet committed while the debounce is pending.
    pub search_input: String,
    /// Last successful response; kept when a later query fails.
    pub result: Option<QueryResult>,
    pub status: QueryStatus,
    pub error_message: Option<String>,
    /// Sequence number of the last query issued.
    pub request_seq: u64,
}

impl PipelineState {
    fn new(criteria: QueryCriteria) -> Self {
        Self {
            criteria,
            search_input: String::new(),
            result: None,
            status: QueryStatus::Idle,
            error_message: None,
            request_seq: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Page count of the last result, at least 1.
    ///
    /// Counted with the page size the result was served at, which may be
    /// smaller than the one requested.
    pub fn total_pages(&self) -> usize {
        self.result.as_ref().map_or(1, QueryResult::total_pages)
    }
}

struct Inner {
    source: Arc<dyn OfferSource>,
    auth: Arc<dyn AuthProvider>,
    state: watch::Sender<PipelineState>,
    debouncer: Debouncer,
}

/// Search, filter and pagination state of an offer list, kept in step with
/// asynchronous fetches.
///
/// Dropping the pipeline cancels a pending search commit; responses to
/// queries still in flight are ignored.
pub struct OfferQueryPipeline {
    inner: Arc<Inner>,
}

impl OfferQueryPipeline {
    /// Create an idle pipeline with default criteria. No query is issued
    /// until [`refresh`](Self::refresh) or a setter commits.
    pub fn new(
        source: Arc<dyn OfferSource>,
        auth: Arc<dyn AuthProvider>,
        config: &ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(PipelineState::new(QueryCriteria::new(config.page_size)));
        Self {
            inner: Arc::new(Inner {
                source,
                auth,
                state,
                debouncer: Debouncer::new(config.search_debounce),
            }),
        }
    }

    pub fn current_state(&self) -> PipelineState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.inner.state.subscribe()
    }

    /// Update the search box text and restart the quiet period.
    ///
    /// The text is committed once it has been stable for the debounce
    /// interval. Committing text equal to the current search issues nothing.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.send_if_modified(|state| {
            if state.search_input == text {
                return false;
            }
            state.search_input = text;
            true
        });

        let weak = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(async move {
            if let Some(inner) = weak.upgrade() {
                inner.commit_search();
            }
        });
    }

    /// Filter by offer type; `None` matches any type.
    pub fn set_type_filter(&self, offer_type: Option<OfferType>) {
        self.inner.commit(|state| {
            if state.criteria.offer_type == offer_type {
                state.criteria.clone()
            } else {
                state.criteria.clone().with_type(offer_type)
            }
        });
    }

    /// Filter by status; `None` matches any status.
    pub fn set_status_filter(&self, status: Option<OfferStatus>) {
        self.inner.commit(|state| {
            if state.criteria.status == status {
                state.criteria.clone()
            } else {
                state.criteria.clone().with_status(status)
            }
        });
    }

    /// Go to `page`, clamped to the pages of the last result.
    pub fn set_page(&self, page: usize) {
        self.inner.commit(|state| {
            let page = page.clamp(1, state.total_pages());
            state.criteria.clone().with_page(page)
        });
    }

    /// Change the page size; 0 is treated as 1.
    pub fn set_page_size(&self, page_size: usize) {
        self.inner.commit(|state| {
            if state.criteria.page_size == page_size.max(1) {
                state.criteria.clone()
            } else {
                state.criteria.clone().with_page_size(page_size)
            }
        });
    }

    /// Re-issue the committed criteria. Also performs the initial load.
    pub fn refresh(&self) {
        self.inner.issue();
    }

    /// Load a single offer, e.g. to prefill an edit form.
    pub async fn offer(&self, id: OfferId) -> Result<OfferRecord, SourceError> {
        let token = self.inner.auth.current_token();
        self.inner.source.get(id, token.as_ref()).await
    }

    /// Validate `form`, create the offer, and refresh the list.
    pub async fn create_offer(&self, form: &OfferForm) -> Result<OfferRecord, MutationError> {
        let input = form.to_new_offer()?;
        let token = self.inner.auth.current_token();

        let created = self
            .inner
            .source
            .create(&input, token.as_ref())
            .await
            .inspect_err(|e| warn!(error = %e, "failed to create offer"))?;

        self.refresh();
        Ok(created)
    }

    /// Validate `form`, replace offer `id`, and refresh the list.
    pub async fn update_offer(
        &self,
        id: OfferId,
        form: &OfferForm,
    ) -> Result<OfferRecord, MutationError> {
        let input = form.to_new_offer()?;
        let token = self.inner.auth.current_token();

        let updated = self
            .inner
            .source
            .update(id, &input, token.as_ref())
            .await
            .inspect_err(|e| warn!(offer_id = %id, error = %e, "failed to update offer"))?;

        self.refresh();
        Ok(updated)
    }

    /// Delete offer `id` and refresh the list.
    pub async fn delete_offer(&self, id: OfferId) -> Result<(), MutationError> {
        let token = self.inner.auth.current_token();

        self.inner
            .source
            .remove(id, token.as_ref())
            .await
            .inspect_err(|e| warn!(offer_id = %id, error = %e, "failed to delete offer"))?;

        self.refresh();
        Ok(())
    }
}

impl Inner {
    fn commit_search(self: &Arc<Self>) {
        self.commit(|state| {
            if state.criteria.search == state.search_input {
                state.criteria.clone()
            } else {
                state.criteria.clone().with_search(state.search_input.clone())
            }
        });
    }

    /// Apply a criteria change and issue a query if the criteria changed.
    fn commit<F>(self: &Arc<Self>, next: F)
    where
        F: FnOnce(&PipelineState) -> QueryCriteria,
    {
        let mut issued = None;
        self.state.send_if_modified(|state| {
            let criteria = next(state);
            if criteria == state.criteria {
                return false;
            }
            state.criteria = criteria;
            issued = Some(Self::begin(state));
            true
        });

        if let Some((seq, criteria)) = issued {
            self.spawn_fetch(seq, criteria);
        }
    }

    /// Issue a query for the committed criteria unconditionally.
    fn issue(self: &Arc<Self>) {
        let mut issued = None;
        self.state.send_modify(|state| {
            issued = Some(Self::begin(state));
        });

        if let Some((seq, criteria)) = issued {
            self.spawn_fetch(seq, criteria);
        }
    }

    fn begin(state: &mut PipelineState) -> (u64, QueryCriteria) {
        state.request_seq += 1;
        state.status = QueryStatus::Loading;
        (state.request_seq, state.criteria.clone())
    }

    fn spawn_fetch(self: &Arc<Self>, seq: u64, criteria: QueryCriteria) {
        let source = Arc::clone(&self.source);
        let token = self.auth.current_token();
        let pipeline: Weak<Inner> = Arc::downgrade(self);

        debug!(
            request_seq = seq,
            page = criteria.page,
            search = %criteria.search,
            "issuing offer query"
        );

        tokio::spawn(async move {
            let outcome = source.query(&criteria, token.as_ref()).await;
            match pipeline.upgrade() {
                Some(inner) => inner.settle(seq, outcome),
                None => debug!(request_seq = seq, "pipeline dropped, response ignored"),
            }
        });
    }

    fn settle(&self, seq: u64, outcome: Result<QueryResult, SourceError>) {
        self.state.send_if_modified(|state| {
            if state.request_seq != seq {
                debug!(
                    request_seq = seq,
                    latest = state.request_seq,
                    "discarding stale offer response"
                );
                return false;
            }

            match outcome {
                Ok(result) => {
                    debug!(
                        request_seq = seq,
                        total = result.total_count,
                        "offer query settled"
                    );
                    state.result = Some(result);
                    state.status = QueryStatus::Idle;
                    state.error_message = None;
                }
                Err(e) => {
                    warn!(request_seq = seq, error = %e, "offer query failed");
                    state.status = QueryStatus::Error;
                    state.error_message = Some(e.to_string());
                }
            }
            true
        });
    }
}
