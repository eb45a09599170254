//! Collection state model and its transition function.
//!
//! Every mutation of a collection goes through [`transition`], so the
//! controller only has to serialise calls to it.

use shared::{
    domain::Item,
    protocol::{Page, PageRequest, PAGE_SIZE},
};

/// How close to the tail consumption has to get before the next page loads.
pub const NEAR_END_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionState {
    Loading,
    Success(Loaded),
    Error { message: String },
}

impl CollectionState {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn loaded(&self) -> Option<&Loaded> {
        match self {
            Self::Success(loaded) => Some(loaded),
            Self::Loading | Self::Error { .. } => None,
        }
    }
}

/// Items committed so far plus the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub items: Vec<Item>,
    pub is_fetching_more: bool,
    pub has_more_pages: bool,
    /// 1-based number of the page the next advance will request.
    pub next_page_number: u32,
}

impl Loaded {
    fn from_first_page(page: Page) -> Self {
        let has_more_pages = page.has_more();
        Self {
            items: page.items,
            is_fetching_more: false,
            has_more_pages,
            next_page_number: page.request.page_number() + 1,
        }
    }

    pub fn next_page_request(&self) -> PageRequest {
        PageRequest::for_page(self.next_page_number, PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    RefreshStarted,
    PageAdvanceStarted,
    PageLoaded(Page),
    ItemCreated(Item),
    Failed { message: String },
}

/// Next state for `event`, or `None` when the event is not legal in `state`.
pub fn transition(state: &CollectionState, event: CollectionEvent) -> Option<CollectionState> {
    match (state, event) {
        (_, CollectionEvent::RefreshStarted) => Some(CollectionState::Loading),
        (_, CollectionEvent::Failed { message }) => Some(CollectionState::Error { message }),

        (CollectionState::Success(loaded), CollectionEvent::PageAdvanceStarted)
            if loaded.has_more_pages && !loaded.is_fetching_more =>
        {
            Some(CollectionState::Success(Loaded {
                is_fetching_more: true,
                ..loaded.clone()
            }))
        }
        (_, CollectionEvent::PageAdvanceStarted) => None,

        (CollectionState::Loading, CollectionEvent::PageLoaded(page))
            if page.request.page_number() == 1 =>
        {
            Some(CollectionState::Success(Loaded::from_first_page(page)))
        }
        (CollectionState::Success(loaded), CollectionEvent::PageLoaded(page))
            if loaded.is_fetching_more
                && page.request.page_number() == loaded.next_page_number =>
        {
            let has_more_pages = page.has_more();
            let mut items = loaded.items.clone();
            items.extend(page.items);
            Some(CollectionState::Success(Loaded {
                items,
                is_fetching_more: false,
                has_more_pages,
                next_page_number: loaded.next_page_number + 1,
            }))
        }
        (_, CollectionEvent::PageLoaded(_)) => None,

        (CollectionState::Success(loaded), CollectionEvent::ItemCreated(item)) => {
            let mut items = Vec::with_capacity(loaded.items.len() + 1);
            items.push(item);
            items.extend(loaded.items.iter().cloned());
            Some(CollectionState::Success(Loaded {
                items,
                ..loaded.clone()
            }))
        }
        (_, CollectionEvent::ItemCreated(_)) => None,
    }
}

/// Decides from a consumption position whether the next page should load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageAdvanceGate {
    near_end_threshold: usize,
}

impl Default for PageAdvanceGate {
    fn default() -> Self {
        Self {
            near_end_threshold: NEAR_END_THRESHOLD,
        }
    }
}

impl PageAdvanceGate {
    #[cfg(test)]
    pub(crate) fn new(near_end_threshold: usize) -> Self {
        Self { near_end_threshold }
    }

    /// Returns the page to request, or `None` when the advance is gated out.
    pub fn evaluate(&self, state: &CollectionState, last_consumed_index: usize) -> Option<PageRequest> {
        let loaded = state.loaded()?;
        if !loaded.has_more_pages || loaded.is_fetching_more {
            return None;
        }
        let near_end = last_consumed_index.saturating_add(self.near_end_threshold) >= loaded.items.len();
        near_end.then(|| loaded.next_page_request())
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
