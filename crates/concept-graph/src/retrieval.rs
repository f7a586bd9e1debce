//! End-to-end retrieval: free-text terms to a related concept subgraph.

use std::collections::HashSet;

use vector_index::Embedding;

use crate::compose::ResultSubgraph;
use crate::graph::ConceptGraph;
use crate::hubs::HubIndex;
use crate::ontology::{ConceptId, SemanticTag};
use crate::resolver::ConceptResolver;
use crate::traversal::{collect_paths, SearchParams, TraversalState};
use crate::Result;

/// External embedding provider: any model turning text into a vector of
/// the resolver's dimension.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Parameters of one retrieval query.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Minimum similarity for a resolved seed.
    pub cutoff_score: f32,
    /// Record paths only at nodes carrying one of these tags.
    pub include_tags: Vec<SemanticTag>,
    /// Terminate branches at nodes carrying one of these tags.
    pub stop_tags: Vec<SemanticTag>,
    /// Traversal depth bound.
    pub max_depth: usize,
    /// Drop paths that touch no seed before composing.
    pub seeds_only: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            cutoff_score: 0.1,
            include_tags: Vec::new(),
            stop_tags: Vec::new(),
            max_depth: 3,
            seeds_only: false,
        }
    }
}

/// A composed subgraph plus the seeds it grew from.
#[derive(Debug, Clone)]
pub struct RelatedSubgraph {
    pub graph: ResultSubgraph,
    pub seeds: Vec<ConceptId>,
}

/// Find the subgraph of concepts related to pre-embedded query terms.
///
/// Every term resolves independently; all resolved seeds then share one
/// traversal state, so concepts reachable from several seeds are claimed
/// by whichever seed's traversal gets there first. No seeds above the
/// cutoff is a valid outcome: the result is simply empty.
pub fn related_subgraphs(
    graph: &ConceptGraph,
    resolver: &ConceptResolver,
    hubs: &HubIndex,
    term_embeddings: &[Embedding],
    config: &RetrievalConfig,
) -> Result<RelatedSubgraph> {
    let mut seeds: Vec<ConceptId> = Vec::new();
    for embedding in term_embeddings {
        let similar = resolver.resolve(embedding, config.cutoff_score)?;
        seeds.extend(similar.into_iter().map(|r| r.concept_id));
    }
    tracing::info!(seeds = seeds.len(), "resolved seed concepts");

    let params = SearchParams {
        include_tags: config.include_tags.clone(),
        stop_tags: config.stop_tags.clone(),
        max_depth: config.max_depth,
    };

    let mut state = TraversalState::new();
    let mut paths = Vec::new();
    for seed in &seeds {
        paths.extend(collect_paths(graph, seed, &params, hubs, &mut state)?);
    }

    let subgraph = if config.seeds_only {
        let seed_set: HashSet<ConceptId> = seeds.iter().cloned().collect();
        ResultSubgraph::from_paths_touching(&paths, &seed_set)
    } else {
        ResultSubgraph::from_paths(&paths)
    };

    Ok(RelatedSubgraph {
        graph: subgraph,
        seeds,
    })
}

/// [`related_subgraphs`] over raw text terms, embedding each through the
/// given provider first.
pub fn related_subgraphs_for_terms(
    graph: &ConceptGraph,
    resolver: &ConceptResolver,
    hubs: &HubIndex,
    embedder: &dyn Embedder,
    terms: &[String],
    config: &RetrievalConfig,
) -> Result<RelatedSubgraph> {
    let embeddings = terms
        .iter()
        .map(|term| embedder.embed(term))
        .collect::<Result<Vec<_>>>()?;
    related_subgraphs(graph, resolver, hubs, &embeddings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Concept, Relationship};
    use crate::GraphError;
    use std::collections::HashMap;

    fn id(s: &str) -> ConceptId {
        ConceptId::from(s)
    }

    fn tag(name: &str) -> SemanticTag {
        SemanticTag::parse(name).unwrap()
    }

    /// 1:"disorder" -> 2:"finding" -> 3:"disorder", with axis embeddings
    /// for 1 and 3.
    fn fixture() -> (ConceptGraph, ConceptResolver) {
        let graph = ConceptGraph::new();
        graph.add_concept(Concept::new("1", "Chest pain").with_tag(tag("disorder")));
        graph.add_concept(Concept::new("2", "Dyspnea").with_tag(tag("finding")));
        graph.add_concept(Concept::new("3", "Angina").with_tag(tag("disorder")));
        graph.add_relationship(Relationship::new("1", "2", "associated_with")).unwrap();
        graph.add_relationship(Relationship::new("2", "3", "associated_with")).unwrap();

        let mut resolver = ConceptResolver::new(2);
        resolver.register(id("1"), Embedding::new(vec![1.0, 0.0])).unwrap();
        resolver.register(id("3"), Embedding::new(vec![0.0, 1.0])).unwrap();
        (graph, resolver)
    }

    #[test]
    fn test_related_subgraph_from_one_term() {
        let (graph, resolver) = fixture();
        let config = RetrievalConfig {
            include_tags: vec![tag("disorder")],
            cutoff_score: 0.9,
            max_depth: 2,
            ..Default::default()
        };

        let result = related_subgraphs(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &[Embedding::new(vec![1.0, 0.0])],
            &config,
        )
        .unwrap();

        assert_eq!(result.seeds, vec![id("1")]);
        assert!(result.graph.contains_edge(&id("1"), &id("2")));
        assert!(result.graph.contains_edge(&id("2"), &id("3")));
        assert_eq!(result.graph.edge_count(), 2);
    }

    #[test]
    fn test_no_resolved_terms_is_empty_not_error() {
        let (graph, resolver) = fixture();
        let config = RetrievalConfig {
            cutoff_score: 0.99,
            ..Default::default()
        };

        let result = related_subgraphs(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &[Embedding::new(vec![50.0, 50.0])],
            &config,
        )
        .unwrap();

        assert!(result.seeds.is_empty());
        assert!(result.graph.is_empty());
    }

    #[test]
    fn test_seeds_share_one_visited_set() {
        let (graph, resolver) = fixture();
        let config = RetrievalConfig {
            cutoff_score: 0.9,
            max_depth: 2,
            ..Default::default()
        };

        // Both terms resolve; the first seed's traversal claims the whole
        // chain, so the second seed contributes no paths of its own.
        let result = related_subgraphs(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &[
                Embedding::new(vec![1.0, 0.0]),
                Embedding::new(vec![0.0, 1.0]),
            ],
            &config,
        )
        .unwrap();

        assert_eq!(result.seeds, vec![id("1"), id("3")]);
        assert_eq!(result.graph.edge_count(), 2);
    }

    #[test]
    fn test_seeds_only_filters_drifted_paths() {
        let (graph, resolver) = fixture();
        let config = RetrievalConfig {
            cutoff_score: 0.9,
            max_depth: 2,
            seeds_only: true,
            ..Default::default()
        };

        let result = related_subgraphs(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &[Embedding::new(vec![1.0, 0.0])],
            &config,
        )
        .unwrap();

        // Every surviving path starts at the seed here, so the graph is
        // unchanged by the filter.
        assert!(result.graph.contains_edge(&id("1"), &id("2")));
    }

    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl Embedder for StubEmbedder {
        fn embed(&self, text: &str) -> Result<Embedding> {
            self.vectors
                .get(text)
                .map(|v| Embedding::new(v.clone()))
                .ok_or_else(|| GraphError::Embedding(format!("no vector for {text:?}")))
        }
    }

    #[test]
    fn test_retrieval_from_text_terms() {
        let (graph, resolver) = fixture();
        let embedder = StubEmbedder {
            vectors: HashMap::from([("chest pain".to_owned(), vec![1.0, 0.0])]),
        };
        let config = RetrievalConfig {
            cutoff_score: 0.9,
            ..Default::default()
        };

        let result = related_subgraphs_for_terms(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &embedder,
            &["chest pain".to_owned()],
            &config,
        )
        .unwrap();
        assert_eq!(result.seeds, vec![id("1")]);

        let err = related_subgraphs_for_terms(
            &graph,
            &resolver,
            &HubIndex::empty(),
            &embedder,
            &["unknown term".to_owned()],
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::Embedding(_)));
    }
}
