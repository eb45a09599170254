use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// Items requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Transport parameters for one page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(rename = "_start")]
    pub offset: u32,
    #[serde(rename = "_limit")]
    pub limit: u32,
}

impl PageRequest {
    /// Maps a 1-based page number onto offset/limit. Page 0 is treated as page 1.
    pub fn for_page(page_number: u32, page_size: u32) -> Self {
        Self {
            offset: page_number.saturating_sub(1).saturating_mul(page_size),
            limit: page_size,
        }
    }

    pub fn first() -> Self {
        Self::for_page(1, PAGE_SIZE)
    }

    pub fn page_number(&self) -> u32 {
        if self.limit == 0 {
            return 1;
        }
        self.offset / self.limit + 1
    }
}

/// One batch of items together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub request: PageRequest,
    pub items: Vec<Item>,
}

impl Page {
    pub fn new(request: PageRequest, items: Vec<Item>) -> Self {
        Self { request, items }
    }

    /// A short page means the listing has no further entries.
    pub fn has_more(&self) -> bool {
        self.items.len() >= self.request.limit as usize
    }
}
