use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use crate::application::ListingRepository;
use crate::domain::{normalize_link, DomainError, Listing, RawListing, UpsertOutcome};

/// Listing store held in process memory. Used with `--memory-storage` and in
/// tests.
pub struct InMemoryListingRepository {
    listings: Arc<Mutex<Vec<Listing>>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::from_listings(Vec::new())
    }

    /// Seeds the store, e.g. from a snapshot file. Later entries whose id or
    /// normalized link is already present are dropped.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut ids: HashSet<String> = HashSet::with_capacity(listings.len());
        let mut keys: HashSet<String> = HashSet::with_capacity(listings.len());
        let mut unique: Vec<Listing> = Vec::with_capacity(listings.len());
        for listing in listings {
            if ids.contains(listing.id()) {
                warn!("Dropping seed listing with duplicate id {}", listing.id());
                continue;
            }
            let key = listing.link_key();
            if keys.contains(&key) {
                warn!("Dropping seed listing {} with duplicate link {}", listing.id(), listing.link());
                continue;
            }
            ids.insert(listing.id().to_string());
            keys.insert(key);
            unique.push(listing);
        }

        Self {
            listings: Arc::new(Mutex::new(unique)),
        }
    }
}

impl Default for InMemoryListingRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first; listings without a creation time last; ties by id.
pub(crate) fn newest_first(a: &Listing, b: &Listing) -> Ordering {
    match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id().cmp(b.id()))
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn upsert_by_link(&self, raw: &RawListing) -> Result<UpsertOutcome, DomainError> {
        let key = raw
            .link_key()
            .ok_or_else(|| DomainError::invalid_input("Listing has no link"))?;

        let mut listings = self.listings.lock().await;
        if let Some(existing) = listings.iter_mut().find(|l| l.link_key() == key) {
            existing.apply_update(raw);
            return Ok(UpsertOutcome::Updated(existing.id().to_string()));
        }

        let listing = Listing::from_raw(raw);
        let id = listing.id().to_string();
        listings.push(listing);
        Ok(UpsertOutcome::Inserted(id))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, DomainError> {
        let listings = self.listings.lock().await;
        Ok(listings.iter().find(|l| l.id() == id).cloned())
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Listing>, DomainError> {
        let key = normalize_link(link);
        let listings = self.listings.lock().await;
        Ok(listings.iter().find(|l| l.link_key() == key).cloned())
    }

    async fn list(&self) -> Result<Vec<Listing>, DomainError> {
        let mut listings = self.listings.lock().await.clone();
        listings.sort_by(newest_first);
        Ok(listings)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.listings.lock().await.len() as u64)
    }
}
