use serde::{Deserialize, Serialize};

use super::Listing;

pub const DEFAULT_PER_PAGE: usize = 30;

/// One page of the listing catalogue, newest first. Pages are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    items: Vec<Listing>,
    page: usize,
    per_page: usize,
    total: usize,
}

impl ListingPage {
    /// Slices `all` into the requested page, clamping `page` into range.
    pub fn paginate(all: Vec<Listing>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total = all.len();
        let total_pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        let items = all
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Self {
            items,
            page,
            per_page,
            total,
        }
    }

    pub fn items(&self) -> &[Listing] {
        &self.items
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
