use async_trait::async_trait;
use shared::{
    domain::{Item, ItemDraft, ItemId},
    error::ListingError,
    protocol::PageRequest,
};

mod controller;
mod detail;
pub mod state;
pub mod transport;

pub use controller::PaginatedCollectionController;
pub use detail::{DetailState, ItemDetailController};
pub use state::{CollectionState, Loaded, PageAdvanceGate};
pub use transport::{HttpListingService, TransportConfig};

/// Remote source of listing items.
///
/// Implementations own their own timeouts; callers never retry on their own.
#[async_trait]
pub trait RemoteListingService: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<Vec<Item>, ListingError>;
    async fn create_item(&self, draft: ItemDraft) -> Result<Item, ListingError>;
    async fn fetch_item(&self, id: ItemId) -> Result<Item, ListingError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
