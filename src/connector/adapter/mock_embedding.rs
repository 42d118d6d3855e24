use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::application::EmbeddingService;
use crate::domain::{DomainError, Embedding, EmbeddingConfig, Listing};

/// Buckets each token is spread over.
const TOKEN_SPREAD: usize = 4;

/// Offline stand-in for the sentence model.
///
/// Uses random indexing: every lowercase word is assigned a fixed sparse
/// signed pattern, seeded from a hash of the word, and a text is the
/// log-weighted sum of its words' patterns. Texts that share words end up
/// closer under cosine similarity; texts with nothing in common are close
/// to orthogonal. Output is deterministic and L2-normalized.
pub struct MockEmbedding {
    config: EmbeddingConfig,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self::with_dimensions(384)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            config: EmbeddingConfig::new("mock-embedding".to_string(), dimensions, 512),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let dimensions = self.config.dimensions();
        let mut vector = vec![0.0f32; dimensions];
        if dimensions == 0 {
            return vector;
        }

        for (token, count) in token_counts(text) {
            let weight = 1.0 + (count as f32).ln();
            let mut rng = StdRng::seed_from_u64(token_seed(&token));
            for _ in 0..TOKEN_SPREAD {
                let index = rng.gen_range(0..dimensions);
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                vector[index] += sign * weight;
            }
        }

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

fn token_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
    {
        *counts.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

fn token_seed(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl EmbeddingService for MockEmbedding {
    async fn embed_listings(&self, listings: &[Listing]) -> Result<Vec<Embedding>, DomainError> {
        let embeddings: Vec<Embedding> = listings
            .iter()
            .map(|listing| {
                Embedding::new(
                    listing.id().to_string(),
                    self.embed_text(&listing.embedding_text()),
                    self.config.model_name().to_string(),
                )
            })
            .collect();

        debug!("Embedded {} listings with the mock model", embeddings.len());
        Ok(embeddings)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embed_text(query))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cosine_similarity;
    use crate::domain::RawListing;

    #[tokio::test]
    async fn test_same_text_same_vector() {
        let service = MockEmbedding::new();

        let first = service.embed_query("Rust systems intern").await.unwrap();
        let second = service.embed_query("Rust systems intern").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 384);
    }

    #[tokio::test]
    async fn test_case_and_punctuation_do_not_matter() {
        let service = MockEmbedding::with_dimensions(128);

        let a = service.embed_query("Python, Backend!").await.unwrap();
        let b = service.embed_query("python backend").await.unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length() {
        let service = MockEmbedding::new();

        let vector = service.embed_query("data analyst intern").await.unwrap();
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();

        assert!((magnitude - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_blank_text_is_zero_vector() {
        let service = MockEmbedding::with_dimensions(16);
        assert_eq!(service.embed_query("  - ").await.unwrap(), vec![0.0; 16]);
    }

    #[tokio::test]
    async fn test_shared_words_score_higher() {
        let service = MockEmbedding::new();
        let listings = vec![
            Listing::from_raw(&RawListing::new(
                "Backend Engineer Intern",
                "Acme",
                "Python services and SQL",
                "https://a.b/1",
            )),
            Listing::from_raw(&RawListing::new(
                "Marketing Intern",
                "Globex",
                "Social media campaigns",
                "https://a.b/2",
            )),
        ];

        let query = service.embed_query("Python backend developer").await.unwrap();
        let embeddings = service.embed_listings(&listings).await.unwrap();

        assert_eq!(embeddings[0].listing_id(), listings[0].id());
        let related = cosine_similarity(&query, embeddings[0].vector());
        let unrelated = cosine_similarity(&query, embeddings[1].vector());
        assert!(related > unrelated, "{related} <= {unrelated}");
        assert!(related > 0.2);
    }
}
