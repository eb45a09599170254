use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Weak,
};

use shared::{
    domain::ItemDraft,
    protocol::{Page, PageRequest},
};
use tokio::sync::{broadcast, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::{
    state::{transition, CollectionEvent, CollectionState, PageAdvanceGate},
    RemoteListingService,
};

const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// Owns one paginated collection and publishes its state.
///
/// Construction starts the first-page load, so it must happen inside a tokio
/// runtime. Dropping the controller detaches any outstanding fetch: its result
/// is discarded instead of committed.
pub struct PaginatedCollectionController {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn RemoteListingService>,
    gate: PageAdvanceGate,
    state: watch::Sender<CollectionState>,
    transitions: broadcast::Sender<CollectionState>,
    /// Bumped by every refresh. Only written while the state cell is locked.
    epoch: AtomicU64,
}

impl PaginatedCollectionController {
    pub fn new(service: Arc<dyn RemoteListingService>) -> Self {
        let (state, _) = watch::channel(CollectionState::Loading);
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        let inner = Arc::new(Inner {
            service,
            gate: PageAdvanceGate::default(),
            state,
            transitions,
            epoch: AtomicU64::new(0),
        });
        inner.refresh();
        Self { inner }
    }

    pub fn state(&self) -> CollectionState {
        self.inner.state.borrow().clone()
    }

    /// Latest-value view of the state. Intermediate states may be skipped.
    pub fn observe(&self) -> watch::Receiver<CollectionState> {
        self.inner.state.subscribe()
    }

    /// Current state followed by every later one, as a stream.
    pub fn updates(&self) -> WatchStream<CollectionState> {
        WatchStream::new(self.observe())
    }

    /// Every committed state in order, including short-lived ones.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<CollectionState> {
        self.inner.transitions.subscribe()
    }

    pub fn refresh(&self) {
        self.inner.refresh();
    }

    pub fn request_page_advance(&self, last_consumed_index: usize) {
        self.inner.request_page_advance(last_consumed_index);
    }

    pub fn add_item(&self, title: impl Into<String>, description: impl Into<String>) {
        self.inner.add_item(ItemDraft::new(title, description));
    }
}

impl Inner {
    fn refresh(self: &Arc<Self>) {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(next) = transition(state, CollectionEvent::RefreshStarted) {
                *state = next;
                let _ = self.transitions.send(state.clone());
            }
        });
        info!(epoch, "collection: refreshing from first page");
        self.spawn_fetch(epoch, PageRequest::first());
    }

    fn request_page_advance(self: &Arc<Self>, last_consumed_index: usize) {
        let mut accepted = None;
        self.state.send_if_modified(|state| {
            let Some(request) = self.gate.evaluate(state, last_consumed_index) else {
                return false;
            };
            let Some(next) = transition(state, CollectionEvent::PageAdvanceStarted) else {
                return false;
            };
            *state = next;
            let _ = self.transitions.send(state.clone());
            accepted = Some((self.epoch.load(Ordering::SeqCst), request));
            true
        });

        match accepted {
            Some((epoch, request)) => {
                info!(
                    page = request.page_number(),
                    last_consumed_index, "collection: advancing to next page"
                );
                self.spawn_fetch(epoch, request);
            }
            None => debug!(last_consumed_index, "collection: page advance gated out"),
        }
    }

    fn add_item(self: &Arc<Self>, draft: ItemDraft) {
        let weak = Arc::downgrade(self);
        let service = Arc::clone(&self.service);
        info!(title = %draft.title, "collection: creating item");
        tokio::spawn(async move {
            let result = service.create_item(draft).await;
            let Some(inner) = weak.upgrade() else {
                debug!("collection: controller dropped; discarding create result");
                return;
            };
            match result {
                Ok(item) => {
                    let id = item.id;
                    if inner.commit(None, CollectionEvent::ItemCreated(item)) {
                        info!(id = id.0, "collection: created item inserted");
                    } else {
                        debug!(id = id.0, "collection: no loaded items to insert created item into");
                    }
                }
                Err(err) => {
                    warn!(error = %err, "collection: item creation failed; resynchronising");
                    let message = format!("failed to add item: {}", err.presentable_message());
                    inner.commit(None, CollectionEvent::Failed { message });
                    inner.refresh();
                }
            }
        });
    }

    fn spawn_fetch(self: &Arc<Self>, epoch: u64, request: PageRequest) {
        let weak: Weak<Inner> = Arc::downgrade(self);
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let result = service.fetch_page(request).await;
            let Some(inner) = weak.upgrade() else {
                debug!(
                    page = request.page_number(),
                    "collection: controller dropped; discarding page"
                );
                return;
            };
            let event = match result {
                Ok(items) => {
                    info!(
                        page = request.page_number(),
                        count = items.len(),
                        "collection: page fetched"
                    );
                    CollectionEvent::PageLoaded(Page::new(request, items))
                }
                Err(err) => {
                    warn!(page = request.page_number(), error = %err, "collection: page fetch failed");
                    CollectionEvent::Failed {
                        message: err.presentable_message(),
                    }
                }
            };
            inner.commit(Some(epoch), event);
        });
    }

    /// Applies `event` under the state lock. With `Some(epoch)`, the event is
    /// dropped if a refresh happened since it was issued.
    fn commit(&self, epoch: Option<u64>, event: CollectionEvent) -> bool {
        self.state.send_if_modified(|state| {
            if let Some(epoch) = epoch {
                let current = self.epoch.load(Ordering::SeqCst);
                if current != epoch {
                    debug!(epoch, current, "collection: discarding stale fetch result");
                    return false;
                }
            }
            match transition(state, event) {
                Some(next) => {
                    *state = next;
                    let _ = self.transitions.send(state.clone());
                    true
                }
                None => false,
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
