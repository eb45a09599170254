use std::{
    collections::VecDeque,
    future::Future,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Item, ItemDraft, ItemId},
    error::ListingError,
    protocol::PageRequest,
};
use tokio::sync::Semaphore;

use crate::RemoteListingService;

/// In-memory listing. Fetches and creates can be held open to observe
/// in-flight state.
pub(crate) struct FakeListingService {
    catalog: Mutex<Vec<Item>>,
    fetch_calls: Mutex<Vec<PageRequest>>,
    create_calls: Mutex<Vec<ItemDraft>>,
    item_calls: Mutex<Vec<ItemId>>,
    fetch_failures: Mutex<VecDeque<ListingError>>,
    create_failures: Mutex<VecDeque<ListingError>>,
    hold_fetches: AtomicBool,
    fetch_gate: Semaphore,
    hold_creates: AtomicBool,
    create_gate: Semaphore,
    next_id: AtomicI64,
}

impl FakeListingService {
    pub(crate) fn with_items(count: i64) -> Self {
        Self {
            catalog: Mutex::new((1..=count).map(sample_item).collect()),
            fetch_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            item_calls: Mutex::new(Vec::new()),
            fetch_failures: Mutex::new(VecDeque::new()),
            create_failures: Mutex::new(VecDeque::new()),
            hold_fetches: AtomicBool::new(false),
            fetch_gate: Semaphore::new(0),
            hold_creates: AtomicBool::new(false),
            create_gate: Semaphore::new(0),
            next_id: AtomicI64::new(101),
        }
    }

    pub(crate) fn hold_fetches(&self) {
        self.hold_fetches.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_fetches(&self, count: usize) {
        self.fetch_gate.add_permits(count);
    }

    pub(crate) fn hold_creates(&self) {
        self.hold_creates.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_creates(&self, count: usize) {
        self.create_gate.add_permits(count);
    }

    pub(crate) fn fail_next_fetch(&self, err: ListingError) {
        self.fetch_failures.lock().expect("lock").push_back(err);
    }

    pub(crate) fn fail_next_create(&self, err: ListingError) {
        self.create_failures.lock().expect("lock").push_back(err);
    }

    pub(crate) fn replace_catalog(&self, items: Vec<Item>) {
        *self.catalog.lock().expect("lock") = items;
    }

    pub(crate) fn fetch_calls(&self) -> Vec<PageRequest> {
        self.fetch_calls.lock().expect("lock").clone()
    }

    pub(crate) fn create_calls(&self) -> Vec<ItemDraft> {
        self.create_calls.lock().expect("lock").clone()
    }

    pub(crate) fn item_calls(&self) -> Vec<ItemId> {
        self.item_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RemoteListingService for FakeListingService {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>, ListingError> {
        self.fetch_calls.lock().expect("lock").push(request);
        if self.hold_fetches.load(Ordering::SeqCst) {
            self.fetch_gate.acquire().await.expect("fetch gate").forget();
        }
        if let Some(err) = self.fetch_failures.lock().expect("lock").pop_front() {
            return Err(err);
        }
        let catalog = self.catalog.lock().expect("lock");
        Ok(catalog
            .iter()
            .skip(request.offset as usize)
            .take(request.limit as usize)
            .cloned()
            .collect())
    }

    async fn create_item(&self, draft: ItemDraft) -> Result<Item, ListingError> {
        self.create_calls.lock().expect("lock").push(draft.clone());
        if self.hold_creates.load(Ordering::SeqCst) {
            self.create_gate.acquire().await.expect("create gate").forget();
        }
        if let Some(err) = self.create_failures.lock().expect("lock").pop_front() {
            return Err(err);
        }
        let id = ItemId(self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(Item::new(id, draft.title, draft.description))
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Item, ListingError> {
        self.item_calls.lock().expect("lock").push(id);
        if let Some(err) = self.fetch_failures.lock().expect("lock").pop_front() {
            return Err(err);
        }
        self.catalog
            .lock()
            .expect("lock")
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(ListingError::Server { status: 404 })
    }
}

pub(crate) fn sample_item(id: i64) -> Item {
    Item::new(ItemId(id), format!("title {id}"), format!("body {id}"))
}

pub(crate) fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|item| item.id.0).collect()
}

/// Fails the test instead of hanging when an expected state never arrives.
pub(crate) async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out waiting for controller")
}

/// Lets spawned tasks run until they block.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
