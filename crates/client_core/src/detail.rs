use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{Item, ItemId},
    error::ListingError,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::RemoteListingService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    Loading,
    Success(Item),
    Error { message: String },
}

/// Loads a single item by id. The most recent `load` wins.
pub struct ItemDetailController {
    inner: Arc<DetailInner>,
}

struct DetailInner {
    service: Arc<dyn RemoteListingService>,
    state: watch::Sender<DetailState>,
    epoch: AtomicU64,
}

impl ItemDetailController {
    pub fn new(service: Arc<dyn RemoteListingService>) -> Self {
        let (state, _) = watch::channel(DetailState::Loading);
        Self {
            inner: Arc::new(DetailInner {
                service,
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> DetailState {
        self.inner.state.borrow().clone()
    }

    pub fn observe(&self) -> watch::Receiver<DetailState> {
        self.inner.state.subscribe()
    }

    /// Accepts the id as typed by the user. Anything that is not a plain
    /// 32-bit integer fails without touching the network.
    pub fn load(&self, raw_id: &str) {
        let mut epoch = 0;
        self.inner.state.send_modify(|state| {
            epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            *state = DetailState::Loading;
        });

        let id = match raw_id.parse::<i32>() {
            Ok(id) => ItemId(i64::from(id)),
            Err(_) => {
                let err = ListingError::InvalidId(raw_id.to_string());
                warn!(error = %err, "detail: rejecting item id");
                self.inner.commit(epoch, Err(err));
                return;
            }
        };

        info!(id = id.0, "detail: loading item");
        let weak = Arc::downgrade(&self.inner);
        let service = Arc::clone(&self.inner.service);
        tokio::spawn(async move {
            let result = service.fetch_item(id).await;
            match weak.upgrade() {
                Some(inner) => inner.commit(epoch, result),
                None => debug!(id = id.0, "detail: controller dropped; discarding item"),
            }
        });
    }
}

impl DetailInner {
    fn commit(&self, epoch: u64, result: Result<Item, ListingError>) {
        self.state.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!(epoch, "detail: discarding superseded load");
                return false;
            }
            *state = match result {
                Ok(item) => DetailState::Success(item),
                Err(err) => {
                    warn!(error = %err, "detail: load failed");
                    DetailState::Error {
                        message: err.presentable_message(),
                    }
                }
            };
            true
        });
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
