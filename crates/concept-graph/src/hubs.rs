//! Hub detection: the globally high-degree concepts that bound traversal.

use std::collections::HashSet;

use crate::graph::ConceptGraph;
use crate::ontology::ConceptId;

/// The top 1% of concepts by total degree (in + out).
///
/// Hub concepts are extremely generic categories with fan-out in the
/// hundreds or thousands; traversal treats them as absorbing boundaries.
/// Recomputed only when the graph is rebuilt, never per query.
#[derive(Debug, Clone)]
pub struct HubIndex {
    hubs: HashSet<ConceptId>,
}

impl HubIndex {
    /// Compute the hub set: `max(1, floor(0.01 * |V|))` nodes of highest
    /// degree. Degree ties resolve to the lower concept ID, so the set is
    /// stable across runs. An empty graph yields an empty set.
    pub fn compute(graph: &ConceptGraph) -> Self {
        let mut degrees: Vec<(ConceptId, usize)> = graph
            .concept_ids()
            .into_iter()
            .map(|id| {
                let degree = graph.degree(&id);
                (id, degree)
            })
            .collect();

        if degrees.is_empty() {
            return Self { hubs: HashSet::new() };
        }

        degrees.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let count = ((degrees.len() as f64) * 0.01).floor() as usize;
        let count = count.max(1);

        let hubs = degrees.into_iter().take(count).map(|(id, _)| id).collect();
        Self { hubs }
    }

    /// An explicit hub set, for callers that precompute or test.
    pub fn from_nodes(nodes: impl IntoIterator<Item = ConceptId>) -> Self {
        Self {
            hubs: nodes.into_iter().collect(),
        }
    }

    /// An empty hub set (traversal without hub short-circuits).
    pub fn empty() -> Self {
        Self { hubs: HashSet::new() }
    }

    /// Whether a concept is a hub.
    pub fn contains(&self, id: &ConceptId) -> bool {
        self.hubs.contains(id)
    }

    /// Number of hubs.
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Concept, Relationship};

    /// Star graph: one center connected to `n` leaves.
    fn star_graph(n: usize) -> (ConceptGraph, ConceptId) {
        let graph = ConceptGraph::new();
        let center = graph.add_concept(Concept::new("center", "Center"));
        for i in 0..n {
            let leaf = graph.add_concept(Concept::new(format!("leaf{i:03}"), format!("Leaf {i}")));
            graph
                .add_relationship(Relationship::new(leaf, center.clone(), "is_a"))
                .unwrap();
        }
        (graph, center)
    }

    #[test]
    fn test_hub_cardinality_small_graph() {
        // 11 nodes: floor(0.11) = 0, clamped to 1
        let (graph, center) = star_graph(10);
        let hubs = HubIndex::compute(&graph);

        assert_eq!(hubs.len(), 1);
        assert!(hubs.contains(&center));
    }

    #[test]
    fn test_hub_cardinality_larger_graph() {
        // 201 nodes: floor(2.01) = 2
        let (graph, center) = star_graph(200);
        let hubs = HubIndex::compute(&graph);

        assert_eq!(hubs.len(), 2);
        assert!(hubs.contains(&center));
    }

    #[test]
    fn test_degree_tie_breaks_to_lower_id() {
        // All leaves have degree 1; the second hub slot goes to leaf000.
        let (graph, _) = star_graph(200);
        let hubs = HubIndex::compute(&graph);

        assert!(hubs.contains(&ConceptId::from("leaf000")));
        assert!(!hubs.contains(&ConceptId::from("leaf001")));
    }

    #[test]
    fn test_empty_graph() {
        let graph = ConceptGraph::new();
        let hubs = HubIndex::compute(&graph);
        assert!(hubs.is_empty());
    }
}
