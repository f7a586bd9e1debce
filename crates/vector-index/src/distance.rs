//! Distance functions over the SIMD kernels.

use crate::simd::{dot_product_simd, squared_euclidean_simd, squared_norm_simd};

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Returns 0.0 when either vector is (numerically) zero.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = dot_product_simd(a, b);
    let norm_a = squared_norm_simd(a).sqrt();
    let norm_b = squared_norm_simd(b).sqrt();

    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Cosine distance (1 - cosine similarity), in [0, 2].
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Squared Euclidean distance.
///
/// Cheaper than [`euclidean_distance`] when only relative ordering matters.
#[inline]
pub fn squared_euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean_simd(a, b)
}

/// Euclidean (L2) distance.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean_simd(a, b).sqrt()
}
