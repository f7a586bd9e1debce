//! Flat (brute-force) vector index for exact nearest neighbor search.
//!
//! Every search scans the whole index, so recall is complete by
//! construction. Concept vocabularies top out around 10^6 vectors, well
//! within what a SIMD scan handles interactively.

use std::collections::HashMap;

use parking_lot::RwLock;
use rayon::prelude::*;

use crate::distance::{cosine_distance, euclidean_distance};
use crate::{DistanceMetric, Embedding, Result, SearchHit, VectorError, VectorId};

#[derive(Debug, Default)]
struct Entries {
    /// Vectors in insertion order. Ties in distance resolve to the earlier
    /// insertion, keeping scan results deterministic.
    vectors: Vec<(VectorId, Embedding)>,
    /// Id to position in `vectors`.
    by_id: HashMap<VectorId, usize>,
}

/// Exact nearest-neighbor index.
///
/// Writes happen during load; queries afterwards are concurrent reads.
#[derive(Debug)]
pub struct FlatIndex {
    dim: usize,
    metric: DistanceMetric,
    entries: RwLock<Entries>,
}

impl FlatIndex {
    /// Create a new index for vectors of the given dimension.
    pub fn new(dim: usize, metric: DistanceMetric) -> Self {
        Self {
            dim,
            metric,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Euclidean index of the given dimension.
    pub fn with_dim(dim: usize) -> Self {
        Self::new(dim, DistanceMetric::Euclidean)
    }

    fn distance_fn(&self) -> fn(&[f32], &[f32]) -> f32 {
        match self.metric {
            DistanceMetric::Euclidean => euclidean_distance,
            DistanceMetric::Cosine => cosine_distance,
        }
    }

    /// Insert a vector, replacing any previous vector with the same id.
    pub fn insert(&self, id: VectorId, embedding: Embedding) -> Result<()> {
        if embedding.dim() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                got: embedding.dim(),
            });
        }

        let mut entries = self.entries.write();
        if let Some(&pos) = entries.by_id.get(&id) {
            entries.vectors[pos].1 = embedding;
        } else {
            let pos = entries.vectors.len();
            entries.vectors.push((id, embedding));
            entries.by_id.insert(id, pos);
        }
        Ok(())
    }

    /// Batch insert multiple vectors.
    pub fn insert_batch(&self, items: Vec<(VectorId, Embedding)>) -> Result<()> {
        for (id, emb) in items {
            self.insert(id, emb)?;
        }
        Ok(())
    }

    /// Search for the k nearest vectors, ascending by distance.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchHit>> {
        if query.dim() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                got: query.dim(),
            });
        }

        let entries = self.entries.read();
        if entries.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let distance_fn = self.distance_fn();
        let query_slice = query.as_slice();

        let mut hits: Vec<SearchHit> = entries
            .vectors
            .par_iter()
            .map(|(id, emb)| SearchHit::new(*id, distance_fn(query_slice, emb.as_slice())))
            .collect();

        // Stable sort keeps insertion order among equal distances.
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        Ok(hits)
    }

    /// Scan the entire index: k = cardinality.
    ///
    /// This is the recall-complete query the concept resolver is built on;
    /// cutoff filtering happens above, on similarity scores.
    pub fn search_all(&self, query: &Embedding) -> Result<Vec<SearchHit>> {
        let k = self.len();
        self.search(query, k)
    }

    /// Get a stored vector by id.
    pub fn get(&self, id: VectorId) -> Option<Embedding> {
        let entries = self.entries.read();
        entries
            .by_id
            .get(&id)
            .map(|&pos| entries.vectors[pos].1.clone())
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.entries.read().vectors.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension this index accepts.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Distance metric in use.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}
