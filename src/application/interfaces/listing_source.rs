use async_trait::async_trait;

use crate::domain::{DomainError, RawListing};

/// A job board (or scraper service in front of several) that returns raw
/// postings for a search term.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self, search_term: &str) -> Result<Vec<RawListing>, DomainError>;

    fn name(&self) -> &str;
}
