use async_trait::async_trait;

use crate::domain::{DomainError, Listing, RawListing, UpsertOutcome};

/// Persistence for listings, keyed for uniqueness by normalized link.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Inserts the record if no listing has the same normalized link, otherwise
    /// updates title, company, description and `updated_at` in place, keeping
    /// the existing identifier.
    async fn upsert_by_link(&self, raw: &RawListing) -> Result<UpsertOutcome, DomainError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, DomainError>;

    async fn find_by_link(&self, link: &str) -> Result<Option<Listing>, DomainError>;

    /// All listings, newest first. Listings without a creation time come last.
    async fn list(&self) -> Result<Vec<Listing>, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
