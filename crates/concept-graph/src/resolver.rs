//! Term-to-concept resolution via nearest-neighbor search.

use std::collections::HashMap;

use vector_index::{Embedding, FlatIndex, VectorId};

use crate::ontology::ConceptId;
use crate::Result;

/// One resolved concept: id plus similarity to the query embedding.
///
/// `score = 1 / (1 + distance)`, so scores live in (0, 1] and a distance of
/// zero maps to a perfect 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub concept_id: ConceptId,
    pub score: f32,
}

/// Maps free-text term embeddings to candidate concepts.
///
/// Wraps the exact flat index and keeps the vector-id to concept-id
/// registry. Queries scan the full index (k = cardinality) rather than a
/// small top-k: recall completeness matters more than query cost at
/// concept-vocabulary scale.
#[derive(Debug)]
pub struct ConceptResolver {
    index: FlatIndex,
    vector_to_concept: HashMap<VectorId, ConceptId>,
    concept_to_vector: HashMap<ConceptId, VectorId>,
    next_vector_id: u64,
}

impl ConceptResolver {
    /// Create a resolver for embeddings of the given dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            index: FlatIndex::with_dim(dim),
            vector_to_concept: HashMap::new(),
            concept_to_vector: HashMap::new(),
            next_vector_id: 0,
        }
    }

    /// Register a concept embedding. Returns the assigned vector id.
    ///
    /// Re-registering a concept replaces its vector and keeps its id.
    pub fn register(&mut self, concept_id: ConceptId, embedding: Embedding) -> Result<VectorId> {
        let vector_id = match self.concept_to_vector.get(&concept_id) {
            Some(&existing) => existing,
            None => {
                let id = VectorId::new(self.next_vector_id);
                self.next_vector_id += 1;
                id
            }
        };

        self.index.insert(vector_id, embedding)?;
        self.vector_to_concept.insert(vector_id, concept_id.clone());
        self.concept_to_vector.insert(concept_id, vector_id);
        Ok(vector_id)
    }

    /// Resolve an embedding to every concept scoring at or above
    /// `cutoff_score`, in index order (ascending distance, which is
    /// descending score).
    ///
    /// An empty result is a valid outcome meaning "no sufficiently similar
    /// concept". A cutoff of 0.0 returns every registered concept. A
    /// dimension mismatch against the index fails and propagates.
    pub fn resolve(
        &self,
        embedding: &Embedding,
        cutoff_score: f32,
    ) -> Result<Vec<SimilarityResult>> {
        let hits = self.index.search_all(embedding)?;

        let results: Vec<SimilarityResult> = hits
            .into_iter()
            .map(|hit| (hit.id, 1.0 / (1.0 + hit.distance)))
            .take_while(|&(_, score)| score >= cutoff_score)
            .filter_map(|(vector_id, score)| {
                self.vector_to_concept
                    .get(&vector_id)
                    .map(|concept_id| SimilarityResult {
                        concept_id: concept_id.clone(),
                        score,
                    })
            })
            .collect();

        tracing::debug!(candidates = results.len(), cutoff_score, "resolved embedding");
        Ok(results)
    }

    /// The stored embedding of a concept, if it was registered.
    pub fn embedding_of(&self, concept_id: &ConceptId) -> Option<Embedding> {
        self.concept_to_vector
            .get(concept_id)
            .and_then(|&vector_id| self.index.get(vector_id))
    }

    /// Whether a concept has a registered embedding.
    pub fn contains(&self, concept_id: &ConceptId) -> bool {
        self.concept_to_vector.contains_key(concept_id)
    }

    /// Number of registered concepts.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Embedding dimension this resolver accepts.
    pub fn dim(&self) -> usize {
        self.index.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_index::VectorError;

    fn resolver_with_axes() -> ConceptResolver {
        let mut resolver = ConceptResolver::new(3);
        resolver
            .register(ConceptId::from("100"), Embedding::new(vec![1.0, 0.0, 0.0]))
            .unwrap();
        resolver
            .register(ConceptId::from("200"), Embedding::new(vec![0.0, 1.0, 0.0]))
            .unwrap();
        resolver
            .register(ConceptId::from("300"), Embedding::new(vec![0.0, 0.0, 1.0]))
            .unwrap();
        resolver
    }

    #[test]
    fn test_resolve_orders_by_similarity() {
        let resolver = resolver_with_axes();
        let results = resolver
            .resolve(&Embedding::new(vec![0.9, 0.1, 0.0]), 0.0)
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].concept_id, ConceptId::from("100"));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_cutoff_filters_and_is_inclusive() {
        let resolver = resolver_with_axes();
        let query = Embedding::new(vec![1.0, 0.0, 0.0]);

        // Exact match scores 1.0; the two orthogonal axes score
        // 1/(1+sqrt(2)) ~ 0.414.
        let strict = resolver.resolve(&query, 0.9).unwrap();
        assert_eq!(strict.len(), 1);
        assert!((strict[0].score - 1.0).abs() < 1e-6);

        let loose = resolver.resolve(&query, 0.41).unwrap();
        assert_eq!(loose.len(), 3);

        // Every returned score honors the cutoff
        for r in &loose {
            assert!(r.score >= 0.41);
        }
    }

    #[test]
    fn test_zero_cutoff_returns_everything() {
        let resolver = resolver_with_axes();
        let results = resolver
            .resolve(&Embedding::new(vec![0.5, 0.5, 0.5]), 0.0)
            .unwrap();
        assert_eq!(results.len(), resolver.len());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let resolver = resolver_with_axes();
        let results = resolver
            .resolve(&Embedding::new(vec![100.0, 100.0, 100.0]), 0.99)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let resolver = resolver_with_axes();
        let err = resolver
            .resolve(&Embedding::new(vec![1.0, 0.0]), 0.1)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::GraphError::Vector(VectorError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_embedding_round_trip() {
        let resolver = resolver_with_axes();
        let emb = resolver.embedding_of(&ConceptId::from("200")).unwrap();
        assert_eq!(emb.as_slice(), &[0.0, 1.0, 0.0]);
        assert!(resolver.embedding_of(&ConceptId::from("999")).is_none());
    }

    #[test]
    fn test_reregister_keeps_vector_id() {
        let mut resolver = ConceptResolver::new(2);
        let first = resolver
            .register(ConceptId::from("1"), Embedding::new(vec![1.0, 0.0]))
            .unwrap();
        let second = resolver
            .register(ConceptId::from("1"), Embedding::new(vec![0.0, 1.0]))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(resolver.len(), 1);
        let emb = resolver.embedding_of(&ConceptId::from("1")).unwrap();
        assert_eq!(emb.as_slice(), &[0.0, 1.0]);
    }
}
