use std::sync::Arc;

use crate::application::ListingRepository;
use crate::domain::{DomainError, Listing, ListingPage};

pub struct ListListingsUseCase {
    listing_repo: Arc<dyn ListingRepository>,
}

impl ListListingsUseCase {
    pub fn new(listing_repo: Arc<dyn ListingRepository>) -> Self {
        Self { listing_repo }
    }

    /// Every listing, newest first. This is the corpus handed to matching.
    pub async fn execute(&self) -> Result<Vec<Listing>, DomainError> {
        self.listing_repo.list().await
    }

    pub async fn page(&self, page: usize, per_page: usize) -> Result<ListingPage, DomainError> {
        let all = self.listing_repo.list().await?;
        Ok(ListingPage::paginate(all, page, per_page))
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        self.listing_repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::adapter::InMemoryListingRepository;
    use crate::domain::RawListing;

    #[tokio::test]
    async fn test_page_through_repository() {
        let repo = Arc::new(InMemoryListingRepository::new());
        for i in 0..7 {
            repo.upsert_by_link(&RawListing::new(
                format!("Intern {i}"),
                "Acme",
                "",
                format!("https://a.b/{i}"),
            ))
            .await
            .unwrap();
        }
        let use_case = ListListingsUseCase::new(repo);

        let page = use_case.page(2, 3).await.unwrap();

        assert_eq!(page.items().len(), 3);
        assert_eq!(page.total(), 7);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(use_case.count().await.unwrap(), 7);
    }
}
