use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::application::EmbeddingService;
use crate::domain::{DomainError, Embedding, EmbeddingConfig, Listing};

/// The sentence-transformers model the resume matcher was tuned against.
const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_DIMENSIONS: usize = 384;
const DEFAULT_MAX_SEQ_LENGTH: usize = 256;
const BATCH_SIZE: usize = 32;

/// Local sentence embeddings through ONNX Runtime.
///
/// The model and tokenizer are fetched from the Hugging Face hub on first
/// use and cached there. Construct once at startup and share the handle;
/// loading the session is the expensive part.
pub struct OrtEmbedding {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    config: EmbeddingConfig,
}

impl OrtEmbedding {
    pub fn new(model_id: Option<&str>) -> Result<Self, DomainError> {
        let model_id = model_id.unwrap_or(DEFAULT_MODEL_ID);
        info!("Initializing ORT embedding service with model: {}", model_id);

        let api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| DomainError::embedding(format!("Failed to create HF API: {}", e)))?;

        let repo = api.model(model_id.to_string());

        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| DomainError::embedding(format!("Failed to download tokenizer: {}", e)))?;

        let model_path = repo
            .get("model.onnx")
            .or_else(|_| repo.get("onnx/model.onnx"))
            .map_err(|e| DomainError::embedding(format!("Failed to download ONNX model: {}", e)))?;

        Self::from_paths(model_path, tokenizer_path, model_id)
    }

    pub fn from_paths(
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        model_name: &str,
    ) -> Result<Self, DomainError> {
        info!("Loading ONNX model from: {:?}", model_path);

        let session = Session::builder()
            .map_err(|e| DomainError::embedding(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DomainError::embedding(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(&model_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load ONNX model: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| DomainError::embedding(format!("Failed to load tokenizer: {}", e)))?;

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            config: EmbeddingConfig::new(
                model_name.to_string(),
                DEFAULT_DIMENSIONS,
                DEFAULT_MAX_SEQ_LENGTH,
            ),
        })
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| DomainError::embedding(format!("Tokenization failed: {}", e)))?;

        let batch_size = encodings.len();
        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.config.max_sequence_length());

        let shape = [batch_size, seq_len];
        let input_ids = tensor(shape, padded(&encodings, seq_len, Encoding::get_ids))?;
        let attention_mask =
            tensor(shape, padded(&encodings, seq_len, Encoding::get_attention_mask))?;
        let token_type_ids = tensor(shape, padded(&encodings, seq_len, Encoding::get_type_ids))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| DomainError::embedding(format!("Failed to lock session: {}", e)))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids,
            ])
            .map_err(|e| DomainError::embedding(format!("Inference failed: {}", e)))?;

        let (_, output) = outputs
            .iter()
            .next()
            .ok_or_else(|| DomainError::embedding("No output tensor found"))?;

        let (output_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::embedding(format!("Failed to extract output tensor: {}", e)))?;
        let output_shape: Vec<usize> = output_shape.iter().map(|&x| x as usize).collect();
        debug!("Output tensor shape: {:?}", output_shape);

        let vectors = match output_shape.as_slice() {
            // Token embeddings: mean-pool over the attention mask.
            [_, tokens, hidden] => (0..batch_size)
                .map(|i| {
                    let mask = encodings[i].get_attention_mask();
                    let offset = i * tokens * hidden;
                    let rows = (0..(*tokens).min(seq_len))
                        .filter(|&j| mask.get(j).copied().unwrap_or(0) > 0)
                        .map(|j| &data[offset + j * hidden..offset + (j + 1) * hidden]);
                    l2_normalize(mean_pool(rows, *hidden))
                })
                .collect(),
            // Already pooled sentence embeddings.
            [_, hidden] => (0..batch_size)
                .map(|i| l2_normalize(data[i * hidden..(i + 1) * hidden].to_vec()))
                .collect(),
            other => {
                return Err(DomainError::embedding(format!(
                    "Unexpected output tensor shape: {:?}",
                    other
                )))
            }
        };

        Ok(vectors)
    }

    fn encode_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            vectors.extend(self.encode_batch(&refs)?);
        }
        Ok(vectors)
    }
}

fn padded(encodings: &[Encoding], seq_len: usize, field: fn(&Encoding) -> &[u32]) -> Vec<i64> {
    let mut values = Vec::with_capacity(encodings.len() * seq_len);
    for encoding in encodings {
        let source = field(encoding);
        let len = source.len().min(seq_len);
        values.extend(source[..len].iter().map(|&x| x as i64));
        values.extend(std::iter::repeat_n(0i64, seq_len - len));
    }
    values
}

fn tensor(shape: [usize; 2], values: Vec<i64>) -> Result<Tensor<i64>, DomainError> {
    Tensor::from_array((shape, values))
        .map_err(|e| DomainError::embedding(format!("Failed to create input tensor: {}", e)))
}

fn mean_pool<'a>(rows: impl Iterator<Item = &'a [f32]>, hidden: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;
    for row in rows {
        for (acc, value) in pooled.iter_mut().zip(row) {
            *acc += value;
        }
        count += 1.0;
    }
    if count > 0.0 {
        for value in &mut pooled {
            *value /= count;
        }
    }
    pooled
}

fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingService for OrtEmbedding {
    async fn embed_listings(&self, listings: &[Listing]) -> Result<Vec<Embedding>, DomainError> {
        let texts: Vec<String> = listings.iter().map(Listing::embedding_text).collect();
        let vectors = self.encode_all(&texts)?;

        Ok(listings
            .iter()
            .zip(vectors)
            .map(|(listing, vector)| {
                Embedding::new(
                    listing.id().to_string(),
                    vector,
                    self.config.model_name().to_string(),
                )
            })
            .collect())
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        self.encode_batch(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("Failed to generate query embedding"))
    }

    fn config(&self) -> &EmbeddingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_and_normalize() {
        let rows: Vec<&[f32]> = vec![&[1.0, 0.0], &[3.0, 0.0]];
        let pooled = mean_pool(rows.into_iter(), 2);
        assert_eq!(pooled, vec![2.0, 0.0]);
        assert_eq!(l2_normalize(pooled), vec![1.0, 0.0]);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    #[ignore = "Requires model download"]
    async fn test_ort_embedding_service() {
        let service = OrtEmbedding::new(None).expect("Failed to create service");

        let embedding = service.embed_query("Python backend developer").await.unwrap();

        assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }
}
