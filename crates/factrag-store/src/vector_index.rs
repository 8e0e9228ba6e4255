//! Exact Vector Index for Semantic Search
//!
//! A flat, in-memory index over fact embeddings. Every query scans all
//! vectors, so results are the true nearest neighbors.
//!
//! # Ordering
//!
//! Results are sorted by distance ascending; equal distances are broken by
//! insertion order (lower fact ID first).

use crate::config::Distance;
use crate::embedding::{cosine_similarity, l2_distance};
use factrag_domain::FactId;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Invalid embedding dimension
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Vectors must be added in ID order without gaps
    #[error("Out of order insert: expected {expected}, got {actual}")]
    OutOfOrder {
        /// Next ID the index expects
        expected: FactId,
        /// ID that was provided
        actual: FactId,
    },
}

/// Flat exact nearest-neighbor index keyed by sequential fact ID
///
/// # Examples
///
/// ```
/// use factrag_domain::FactId;
/// use factrag_store::Distance;
/// use factrag_store::vector_index::VectorIndex;
///
/// let mut index = VectorIndex::new(2, Distance::L2);
/// index.add(FactId::new(0), &[0.0, 1.0]).unwrap();
/// index.add(FactId::new(1), &[1.0, 0.0]).unwrap();
///
/// let results = index.search(&[0.9, 0.1], Some(1), |_| true).unwrap();
/// assert_eq!(results[0].0, FactId::new(1));
/// ```
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    distance: Distance,
    /// Position `i` holds the embedding of fact `f<i>`
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new(dimension: usize, distance: Distance) -> Self {
        Self {
            dimension,
            distance,
            vectors: Vec::new(),
        }
    }

    /// Embedding dimension accepted by this index
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Add the embedding for the next fact ID
    pub fn add(&mut self, id: FactId, embedding: &[f32]) -> Result<(), VectorIndexError> {
        self.check_dimension(embedding)?;
        let expected = FactId::new(self.vectors.len() as u64);
        if id != expected {
            return Err(VectorIndexError::OutOfOrder { expected, actual: id });
        }
        self.vectors.push(embedding.to_vec());
        Ok(())
    }

    /// Find the nearest vectors to `query` among IDs accepted by `filter`
    ///
    /// `limit` of `None` returns every accepted vector.
    pub fn search<F>(
        &self,
        query: &[f32],
        limit: Option<usize>,
        filter: F,
    ) -> Result<Vec<(FactId, f32)>, VectorIndexError>
    where
        F: Fn(FactId) -> bool,
    {
        self.check_dimension(query)?;

        let mut scored: Vec<(FactId, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (FactId::new(position as u64), vector))
            .filter(|(id, _)| filter(*id))
            .map(|(id, vector)| (id, self.distance_between(query, vector)))
            .collect();

        scored.sort_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });

        if let Some(limit) = limit {
            scored.truncate(limit);
        }
        Ok(scored)
    }

    fn distance_between(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.distance {
            Distance::L2 => l2_distance(a, b),
            Distance::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
