//! Embedding helpers for text vectorization
//!
//! This module provides the mock embedding model used in tests and offline
//! runs, distance helpers, and the batching/truncation discipline applied
//! before any text reaches an embedding model.
//!
//! # Examples
//!
//! ```rust
//! use factrag_domain::traits::EmbeddingModel;
//! use factrag_store::embedding::MockEmbeddingModel;
//!
//! let model = MockEmbeddingModel::new(64);
//! let embedding = model.embed("The sky is blue").unwrap();
//! assert_eq!(embedding.len(), 64);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("The sky is blue").unwrap());
//! ```

use crate::config::EmbeddingConfig;
use factrag_domain::traits::EmbeddingModel;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::debug;

/// Errors produced by [`MockEmbeddingModel`]
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Deterministic hash-based embedding model
///
/// Embeddings are deterministic, normalized to unit length, and differ for
/// different texts. They carry no semantic meaning.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Create a new mock embedding model
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Hash text with a seed to get a deterministic value in [-1, 1]
    fn hash_with_seed(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();
        ((hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_with_seed(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity in [-1, 1]; 0.0 when either vector is zero
///
/// # Panics
///
/// Panics if vectors have different lengths
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Euclidean distance between two vectors of equal length
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Shorten `text` until `count_tokens` reports at most `max_tokens`
///
/// Each step drops the last `step` characters and appends `...`. Text that
/// is already no longer than one step is returned as is, even if still over
/// budget. The shortened text is only ever used for embedding; the stored
/// fact keeps its full content.
pub fn shorten_text(
    text: &str,
    max_tokens: usize,
    step: usize,
    count_tokens: impl Fn(&str) -> usize,
) -> String {
    let step = step.max(4);
    let mut shortened = text.to_string();
    while count_tokens(&shortened) > max_tokens {
        let chars = shortened.chars().count();
        if chars <= step {
            break;
        }
        let cut = shortened
            .char_indices()
            .nth(chars - step)
            .map(|(byte, _)| byte)
            .unwrap_or(0);
        shortened.truncate(cut);
        shortened.push_str("...");
    }
    shortened
}

/// Embed `texts` in order, in batches of at most `max_batch_size`
///
/// Every text is truncated to the token budget before being sent.
pub fn embed_in_batches<E: EmbeddingModel>(
    model: &E,
    texts: &[String],
    config: &EmbeddingConfig,
) -> Result<Vec<Vec<f32>>, E::Error> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(config.max_batch_size.max(1)) {
        let prepared: Vec<String> = batch
            .iter()
            .map(|text| {
                shorten_text(text, config.max_tokens, config.truncate_step, |t| {
                    model.token_count(t)
                })
            })
            .collect();
        debug!(batch_size = prepared.len(), "Embedding batch");
        embeddings.extend(model.embed_batch(&prepared)?);
    }
    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_mock_embedding_deterministic() {
        let model = MockEmbeddingModel::new(384);
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(model.embed(text).unwrap(), model.embed(text).unwrap());
    }

    #[test]
    fn test_mock_embedding_dimension() {
        let model = MockEmbeddingModel::new(128);
        assert_eq!(model.embed("test").unwrap().len(), 128);
        assert_eq!(model.dimension(), 128);
    }

    #[test]
    fn test_mock_embedding_normalized() {
        let model = MockEmbeddingModel::new(384);
        let embedding = model.embed("test text").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001, "Embedding should be normalized");
    }

    #[test]
    fn test_mock_embedding_empty_text() {
        let model = MockEmbeddingModel::new(384);
        let result = model.embed("");
        assert!(result.unwrap_err().to_string().contains("Empty text"));
    }

    #[test]
    fn test_cosine_similarity_cases() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.0001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.0001);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.0001);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_l2_distance() {
        assert!((l2_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 0.0001);
        assert_eq!(l2_distance(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_shorten_text_under_budget_unchanged() {
        let text = "short text";
        assert_eq!(shorten_text(text, 100, 250, |t| t.chars().count()), text);
    }

    #[test]
    fn test_shorten_text_cuts_in_steps_from_end() {
        let text = "a".repeat(1000);
        // One token per character, budget of 600
        let shortened = shorten_text(&text, 600, 250, |t| t.chars().count());
        // 1000 -> 753 -> 506
        assert_eq!(shortened.chars().count(), 506);
        assert!(shortened.ends_with("..."));
        assert!(shortened.starts_with("aaaa"));
    }

    #[test]
    fn test_shorten_text_respects_char_boundaries() {
        let text = "é".repeat(600);
        let shortened = shorten_text(&text, 100, 250, |t| t.chars().count());
        // 600 -> 353 -> 106, then too short for another step
        assert_eq!(shortened.chars().count(), 106);
        assert!(shortened.ends_with("..."));
    }

    #[test]
    fn test_shorten_text_stops_when_too_short_to_cut() {
        let text = "x".repeat(200);
        let shortened = shorten_text(&text, 10, 250, |t| t.chars().count());
        assert_eq!(shortened, text);
    }

    struct CountingModel {
        batches: RefCell<Vec<usize>>,
    }

    impl EmbeddingModel for CountingModel {
        type Error = EmbeddingError;

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![text.len() as f32])
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.batches.borrow_mut().push(texts.len());
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_embed_in_batches_respects_batch_size() {
        let model = CountingModel { batches: RefCell::new(Vec::new()) };
        let texts: Vec<String> = (0..250).map(|i| format!("fact {}", i)).collect();
        let config = EmbeddingConfig::default();

        let embeddings = embed_in_batches(&model, &texts, &config).unwrap();

        assert_eq!(embeddings.len(), 250);
        assert_eq!(*model.batches.borrow(), vec![100, 100, 50]);
        assert_eq!(embeddings[0], vec!["fact 0".len() as f32]);
    }
}
