use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::llm_ranker::LlmRanker;
use super::shortlist_prompt::ShortlistPromptBuilder;
use super::similarity_filter::select_top_k;
use crate::application::{ChatClient, EmbeddingService};
use crate::domain::{DomainError, Listing, RankedListing, RankingConfig};

/// Two-stage resume matching: a cheap embedding filter narrows the corpus to
/// a shortlist, then the reasoning model scores that shortlist.
///
/// Only embedding failures reach the caller as errors. Anything that goes
/// wrong in the ranking stage is logged and yields an empty list, which the
/// caller should present as "no matches".
pub struct RankCandidatesUseCase {
    embedding_service: Arc<dyn EmbeddingService>,
    ranker: LlmRanker,
    config: RankingConfig,
}

impl RankCandidatesUseCase {
    pub fn new(
        embedding_service: Arc<dyn EmbeddingService>,
        chat_client: Arc<dyn ChatClient>,
        config: RankingConfig,
    ) -> Self {
        Self {
            ranker: LlmRanker::new(chat_client, &config),
            embedding_service,
            config,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Number of ranking stages that failed closed since construction.
    pub fn ranker_failures(&self) -> u64 {
        self.ranker.failure_count()
    }

    pub async fn execute(
        &self,
        query_text: &str,
        corpus: &[Listing],
    ) -> Result<Vec<RankedListing>, DomainError> {
        self.rank_candidates(
            query_text,
            corpus,
            self.config.top_k_filter(),
            self.config.top_n_result(),
        )
        .await
    }

    pub async fn rank_candidates(
        &self,
        query_text: &str,
        corpus: &[Listing],
        top_k_filter: usize,
        top_n_result: usize,
    ) -> Result<Vec<RankedListing>, DomainError> {
        if corpus.is_empty() || query_text.trim().is_empty() || top_k_filter == 0 || top_n_result == 0 {
            debug!(
                "Nothing to rank (corpus={}, query_chars={}, top_k={}, top_n={})",
                corpus.len(),
                query_text.trim().len(),
                top_k_filter,
                top_n_result
            );
            return Ok(Vec::new());
        }

        let start_time = Instant::now();
        info!(
            "Ranking {} listings (top_k_filter={}, top_n_result={})",
            corpus.len(),
            top_k_filter,
            top_n_result
        );

        let query_vector = self.embedding_service.embed_query(query_text).await?;
        let expected = self.embedding_service.config().dimensions();
        if query_vector.len() != expected {
            return Err(DomainError::embedding(format!(
                "Query embedding has {} dimensions, model {} produces {}",
                query_vector.len(),
                self.embedding_service.config().model_name(),
                expected
            )));
        }
        let embeddings = self.embedding_service.embed_listings(corpus).await?;
        if embeddings.len() != corpus.len() {
            return Err(DomainError::embedding(format!(
                "Expected {} listing embeddings, got {}",
                corpus.len(),
                embeddings.len()
            )));
        }

        let shortlist = select_top_k(&query_vector, &embeddings, top_k_filter)?;

        let by_id: HashMap<&str, &Listing> = corpus.iter().map(|l| (l.id(), l)).collect();
        let shortlisted: Vec<&Listing> = shortlist
            .iter()
            .filter_map(|entry| by_id.get(entry.listing_id()).copied())
            .collect();
        debug!(
            "Shortlisted {} listings in {:.2}s",
            shortlisted.len(),
            start_time.elapsed().as_secs_f64()
        );

        let prompt = ShortlistPromptBuilder::new(&self.config)
            .with_top_n(top_n_result)
            .build(query_text, &shortlisted);
        if prompt.is_empty() {
            warn!("Prompt budget left no room for any listing; skipping ranking");
            return Ok(Vec::new());
        }

        let mut results = match self.ranker.rank(&prompt).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Ranking failed closed: {}", e);
                return Ok(Vec::new());
            }
        };

        // Stable: equal scores keep the model's order.
        results.sort_by(|a, b| b.score().cmp(&a.score()));

        let ranked: Vec<RankedListing> = results
            .into_iter()
            .filter_map(|result| {
                by_id
                    .get(result.listing_id())
                    .map(|listing| RankedListing::new((*listing).clone(), result))
            })
            .take(top_n_result)
            .collect();

        info!(
            "Ranked {} matches in {:.2}s",
            ranked.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(ranked)
    }
}
