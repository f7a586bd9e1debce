//! Importance ranking of candidate concepts.
//!
//! For callers that want a ranked list instead of a subgraph: each
//! candidate is scored by local neighborhood size, global PageRank
//! standing, and how strongly the candidate set clusters around it in
//! embedding space. Read-only and side-effect-free.

use std::collections::HashSet;

use crate::graph::ConceptGraph;
use crate::neighborhood::ego_graph;
use crate::ontology::ConceptId;
use crate::resolver::ConceptResolver;
use crate::stats::GraphStats;
use crate::Result;

/// Knobs for [`rank_concepts`].
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Hop radius of the ego graph behind the local importance term.
    pub ego_radius: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self { ego_radius: 1 }
    }
}

/// Order candidates by combined importance, descending. Ties keep the
/// candidates' discovery order (stable sort).
///
/// Per candidate, three additive terms:
/// - local: node count of its `ego_radius`-hop undirected neighborhood;
/// - global: 1.0 when it sits in the top-N PageRank set of `stats`;
/// - semantic: sum of similarity scores of the *other* candidates appearing
///   in a nearest-neighbor lookup on the candidate's own embedding — high
///   when the candidate set clusters around it. Candidates without a
///   registered embedding contribute 0 here.
pub fn rank_concepts(
    candidates: &[ConceptId],
    graph: &ConceptGraph,
    stats: &GraphStats,
    resolver: &ConceptResolver,
    options: &RankOptions,
) -> Result<Vec<ConceptId>> {
    let candidate_set: HashSet<&ConceptId> = candidates.iter().collect();

    let mut scored: Vec<(ConceptId, f64)> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let local = ego_graph(graph, candidate, options.ego_radius)?.node_count() as f64;
        let global = if stats.is_top(candidate) { 1.0 } else { 0.0 };

        let semantic = match resolver.embedding_of(candidate) {
            Some(embedding) => resolver
                .resolve(&embedding, 0.0)?
                .into_iter()
                .filter(|r| r.concept_id != *candidate && candidate_set.contains(&r.concept_id))
                .map(|r| r.score as f64)
                .sum(),
            None => 0.0,
        };

        scored.push((candidate.clone(), local + global + semantic));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(scored.into_iter().map(|(id, _)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Concept, Relationship};
    use vector_index::Embedding;

    fn id(s: &str) -> ConceptId {
        ConceptId::from(s)
    }

    fn bare_graph(ids: &[&str]) -> ConceptGraph {
        let graph = ConceptGraph::new();
        for s in ids {
            graph.add_concept(Concept::new(*s, format!("Concept {s}")));
        }
        graph
    }

    #[test]
    fn test_local_degree_dominates() {
        // Node 1 is the center of a star; everything else is a leaf.
        let graph = bare_graph(&["1", "2", "3", "4"]);
        for leaf in ["2", "3", "4"] {
            graph.add_relationship(Relationship::new(leaf, "1", "is_a")).unwrap();
        }
        let stats = GraphStats::compute(&graph, 0);
        let resolver = ConceptResolver::new(2);

        let candidates = [id("2"), id("1"), id("3")];
        let ranked =
            rank_concepts(&candidates, &graph, &stats, &resolver, &RankOptions::default())
                .unwrap();

        assert_eq!(ranked[0], id("1"));
    }

    #[test]
    fn test_pagerank_membership_breaks_local_ties() {
        // In the chain 1 -> 2 -> 3, the endpoints have equal ego graphs,
        // but the sink 3 collects the rank mass.
        let graph = bare_graph(&["1", "2", "3"]);
        graph.add_relationship(Relationship::new("1", "2", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("2", "3", "is_a")).unwrap();
        let stats = GraphStats::compute(&graph, 1);
        assert!(stats.is_top(&id("3")));
        let resolver = ConceptResolver::new(2);

        let ranked = rank_concepts(
            &[id("1"), id("3")],
            &graph,
            &stats,
            &resolver,
            &RankOptions::default(),
        )
        .unwrap();

        assert_eq!(ranked[0], id("3"));
    }

    #[test]
    fn test_semantic_cluster_signal() {
        // No edges, no pagerank top set: only the semantic term differs.
        let graph = bare_graph(&["1", "2", "3"]);
        let stats = GraphStats::compute(&graph, 0);

        let mut resolver = ConceptResolver::new(2);
        // 2 and 3 cluster tightly; 1 sits far away.
        resolver.register(id("1"), Embedding::new(vec![100.0, 0.0])).unwrap();
        resolver.register(id("2"), Embedding::new(vec![0.0, 1.0])).unwrap();
        resolver.register(id("3"), Embedding::new(vec![0.0, 1.1])).unwrap();

        let ranked = rank_concepts(
            &[id("1"), id("2"), id("3")],
            &graph,
            &stats,
            &resolver,
            &RankOptions::default(),
        )
        .unwrap();

        assert_eq!(ranked[2], id("1"));
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let graph = bare_graph(&["5", "4", "9"]);
        let stats = GraphStats::compute(&graph, 0);
        let resolver = ConceptResolver::new(2);

        let candidates = [id("5"), id("4"), id("9")];
        let ranked =
            rank_concepts(&candidates, &graph, &stats, &resolver, &RankOptions::default())
                .unwrap();

        assert_eq!(ranked, vec![id("5"), id("4"), id("9")]);
    }

    #[test]
    fn test_missing_candidate_is_error() {
        let graph = bare_graph(&["1"]);
        let stats = GraphStats::compute(&graph, 0);
        let resolver = ConceptResolver::new(2);

        let result = rank_concepts(
            &[id("404")],
            &graph,
            &stats,
            &resolver,
            &RankOptions::default(),
        );
        assert!(matches!(result, Err(crate::GraphError::NodeNotFound(_))));
    }
}
