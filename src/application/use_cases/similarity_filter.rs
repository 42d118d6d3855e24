use crate::domain::{DomainError, Embedding, ShortlistEntry};

/// Cosine similarity of two vectors. Zero-norm or mismatched inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Selects the `k` corpus entries most similar to `query`.
///
/// Results are ordered by descending cosine similarity. Equal scores keep
/// their corpus order (the sort is stable), so the output is deterministic
/// for a given corpus ordering. Non-finite scores rank below every real score.
///
/// Every corpus vector must have the query's dimensionality; a mismatch means
/// the vectors came from different models and is reported as an embedding error.
pub fn select_top_k(
    query: &[f32],
    corpus: &[Embedding],
    k: usize,
) -> Result<Vec<ShortlistEntry>, DomainError> {
    if let Some(bad) = corpus.iter().find(|e| e.dimensions() != query.len()) {
        return Err(DomainError::embedding(format!(
            "Dimension mismatch for listing {}: expected {}, got {}",
            bad.listing_id(),
            query.len(),
            bad.dimensions()
        )));
    }

    let mut scored: Vec<ShortlistEntry> = corpus
        .iter()
        .map(|embedding| {
            let score = cosine_similarity(query, embedding.vector());
            let score = if score.is_finite() { score } else { f32::MIN };
            ShortlistEntry::new(embedding.listing_id(), score)
        })
        .collect();

    scored.sort_by(|a, b| b.score().total_cmp(&a.score()));
    scored.truncate(k);

    Ok(scored)
}
