//! # medgraph Vector Index
//!
//! Dense embeddings and exact nearest-neighbor search for the concept
//! resolution layer.
//!
//! The concept vocabulary sits in the 10^5–10^6 range, so an exact flat
//! index is the right trade: every query scans the whole index and recall
//! is complete by construction. See [`FlatIndex`].

pub mod simd;
pub mod distance;
pub mod flat;

pub use distance::{cosine_similarity, euclidean_distance, squared_euclidean_distance};
pub use flat::FlatIndex;

use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A dense vector embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from raw data.
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Create a zero embedding of given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    /// Dimension of this embedding.
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    /// Normalize in-place (L2 norm). No-op on the zero vector.
    pub fn normalize(&mut self) {
        simd::normalize_simd(&mut self.data);
    }

    /// Raw slice access.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl Deref for Embedding {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Identifier of a vector in the index.
///
/// Assigned by the caller at registration time; the concept layer keeps the
/// mapping from vector ids back to concept ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VectorId(pub u64);

impl VectorId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// One hit from an index scan: a vector id and its distance to the query.
///
/// Distances are raw (metric-dependent); similarity conversion is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: VectorId,
    pub distance: f32,
}

impl SearchHit {
    pub fn new(id: VectorId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Distance metric for vector comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    #[default]
    Euclidean,
    /// Cosine distance (1 - cosine similarity).
    Cosine,
}

/// Error types for vector operations.
#[derive(Debug, thiserror::Error)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, VectorError>;
