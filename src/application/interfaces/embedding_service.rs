use async_trait::async_trait;

use crate::domain::{DomainError, Embedding, EmbeddingConfig, Listing};

/// Generates vector embeddings for listings and resume queries.
///
/// Listing and query vectors must come from the same implementation so they
/// share a dimensionality and are directly comparable.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds all listings, returning one embedding per listing in input order.
    async fn embed_listings(&self, listings: &[Listing]) -> Result<Vec<Embedding>, DomainError>;

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError>;

    /// Model name and the dimensionality every returned vector has.
    fn config(&self) -> &EmbeddingConfig;
}
