//! Root catalog state and the fetch orchestrator that writes into it.

use std::{
    fmt,
    future::Future,
    panic,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};

use anyhow::Result;
use shared::domain::{ItemTypeFilter, SortOrder};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    collection::{CollectionAction, CollectionState, FetchPayload},
    criteria::{CriteriaSnapshot, FilterState, SortState},
    port::CatalogQueryPort,
    settings::ResolutionPolicy,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Sequence number assigned to a fetch when it is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three partitions a collection fetch depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub filter: FilterState,
    pub sort: SortState,
    pub products: CollectionState,
}

#[derive(Debug, Clone)]
pub enum CatalogEvent {
    FetchStarted {
        request_id: RequestId,
        criteria: CriteriaSnapshot,
    },
    StateChanged(CollectionState),
    FetchDiscarded {
        request_id: RequestId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Succeeded {
        request_id: RequestId,
        item_count: usize,
        total: u64,
    },
    Failed {
        request_id: RequestId,
        message: String,
    },
    /// A newer fetch was dispatched before this one resolved; nothing was written.
    Superseded { request_id: RequestId },
}

impl FetchOutcome {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Succeeded { request_id, .. }
            | Self::Failed { request_id, .. }
            | Self::Superseded { request_id } => *request_id,
        }
    }
}

struct StoreInner {
    state: CatalogState,
    last_dispatched: u64,
}

pub struct CatalogStore {
    port: Arc<dyn CatalogQueryPort>,
    policy: ResolutionPolicy,
    inner: Mutex<StoreInner>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogStore {
    pub fn new(port: Arc<dyn CatalogQueryPort>) -> Arc<Self> {
        Self::new_with_policy(port, ResolutionPolicy::default())
    }

    pub fn new_with_policy(port: Arc<dyn CatalogQueryPort>, policy: ResolutionPolicy) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            port,
            policy,
            inner: Mutex::new(StoreInner {
                state: CatalogState::default(),
                last_dispatched: 0,
            }),
            events,
        })
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Read-only projection of the collection partition.
    pub fn products(&self) -> CollectionState {
        self.lock().state.products.clone()
    }

    pub fn state(&self) -> CatalogState {
        self.lock().state.clone()
    }

    pub fn set_page(&self, page: u32) {
        let products = {
            let mut guard = self.lock();
            guard.state.products.apply(CollectionAction::SetPage(page));
            guard.state.products.clone()
        };
        debug!(page, "catalog: page set");
        self.publish(CatalogEvent::StateChanged(products));
    }

    pub fn set_sort_type(&self, sort_type: SortOrder) {
        self.lock().state.sort.sort_type = sort_type;
        debug!(sort = sort_type.as_str(), "catalog: sort order set");
    }

    pub fn toggle_tag(&self, tag: impl Into<String>) -> bool {
        self.lock().state.filter.toggle_tag(tag)
    }

    pub fn toggle_brand(&self, brand: impl Into<String>) -> bool {
        self.lock().state.filter.toggle_brand(brand)
    }

    pub fn set_selected_tags<I, S>(&self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().state.filter.set_tags(tags);
    }

    pub fn set_selected_brands<I, S>(&self, brands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().state.filter.set_brands(brands);
    }

    pub fn clear_filters(&self) {
        self.lock().state.filter.clear();
    }

    /// Starts a collection fetch.
    ///
    /// The criteria snapshot is taken and the collection enters `loading` before this returns.
    /// The round trip runs as a spawned task that applies its outcome whether or not the returned
    /// [`PendingFetch`] is awaited, so dropping it only detaches the caller. Must be called from
    /// within a tokio runtime. Overlapping fetches are not fenced under
    /// [`ResolutionPolicy::LastResolved`].
    pub fn fetch_products(self: &Arc<Self>, filter_type: ItemTypeFilter) -> PendingFetch {
        let (request_id, criteria) = self.dispatch(filter_type);
        let store = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = run_query(Arc::clone(&store.port), criteria).await;
            store.settle(request_id, result)
        });
        PendingFetch { request_id, task }
    }

    fn dispatch(&self, filter_type: ItemTypeFilter) -> (RequestId, CriteriaSnapshot) {
        let (request_id, criteria, products) = {
            let mut guard = self.lock();
            guard.last_dispatched += 1;
            let request_id = RequestId(guard.last_dispatched);
            let state = &guard.state;
            let criteria =
                CriteriaSnapshot::capture(&state.filter, &state.sort, &state.products, filter_type);
            guard.state.products.apply(CollectionAction::FetchPending);
            (request_id, criteria, guard.state.products.clone())
        };

        info!(
            request_id = request_id.0,
            page = criteria.page,
            sort = criteria.sort_value.as_str(),
            filter_type = criteria.filter_type.as_str(),
            tags = criteria.tags.len(),
            brands = criteria.brands.len(),
            "catalog: fetch dispatched"
        );
        self.publish(CatalogEvent::FetchStarted {
            request_id,
            criteria: criteria.clone(),
        });
        self.publish(CatalogEvent::StateChanged(products));
        (request_id, criteria)
    }

    fn settle(&self, request_id: RequestId, result: Result<FetchPayload>) -> FetchOutcome {
        let mut guard = self.lock();
        if self.policy == ResolutionPolicy::LatestDispatched
            && request_id.0 != guard.last_dispatched
        {
            let latest = guard.last_dispatched;
            drop(guard);
            info!(
                request_id = request_id.0,
                latest_request_id = latest,
                "catalog: discarding superseded fetch outcome"
            );
            self.publish(CatalogEvent::FetchDiscarded { request_id });
            return FetchOutcome::Superseded { request_id };
        }

        let outcome = match result {
            Ok(payload) => {
                let outcome = FetchOutcome::Succeeded {
                    request_id,
                    item_count: payload.data.len(),
                    total: payload.total,
                };
                guard
                    .state
                    .products
                    .apply(CollectionAction::FetchFulfilled(payload));
                outcome
            }
            Err(err) => {
                let message = format!("{err:#}");
                guard.state.products.apply(CollectionAction::FetchRejected {
                    message: message.clone(),
                });
                FetchOutcome::Failed {
                    request_id,
                    message,
                }
            }
        };
        let products = guard.state.products.clone();
        drop(guard);

        match &outcome {
            FetchOutcome::Succeeded {
                item_count, total, ..
            } => info!(
                request_id = request_id.0,
                item_count,
                total,
                page_count = products.page_count,
                "catalog: fetch succeeded"
            ),
            FetchOutcome::Failed { message, .. } => {
                warn!(request_id = request_id.0, error = %message, "catalog: fetch failed")
            }
            FetchOutcome::Superseded { .. } => {}
        }
        self.publish(CatalogEvent::StateChanged(products));
        outcome
    }

    fn publish(&self, event: CatalogEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a dispatched fetch; resolves to its [`FetchOutcome`].
#[derive(Debug)]
pub struct PendingFetch {
    request_id: RequestId,
    task: JoinHandle<FetchOutcome>,
}

impl PendingFetch {
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }
}

impl Future for PendingFetch {
    type Output = FetchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let request_id = self.request_id;
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(err)) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            // only reachable when the runtime shuts down under the task
            Poll::Ready(Err(err)) => Poll::Ready(FetchOutcome::Failed {
                request_id,
                message: err.to_string(),
            }),
        }
    }
}

/// Both phases of the envelope must resolve before there is a payload.
async fn run_query(
    port: Arc<dyn CatalogQueryPort>,
    criteria: CriteriaSnapshot,
) -> Result<FetchPayload> {
    let envelope = port.fetch_product_items(&criteria).await?;
    let total = envelope.total;
    let data = envelope.response.await?;
    Ok(FetchPayload { data, total })
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
