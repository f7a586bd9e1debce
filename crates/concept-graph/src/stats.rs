//! Whole-graph centrality statistics, computed once at load time.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::graph::ConceptGraph;
use crate::ontology::ConceptId;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1.0e-6;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Read-only PageRank snapshot over the whole concept graph.
///
/// PageRank is an expensive whole-graph computation; it runs once when the
/// graph is loaded and is passed explicitly into ranking calls. The version
/// distinguishes snapshots when a graph is ever rebuilt in-process.
#[derive(Debug, Clone)]
pub struct GraphStats {
    version: u64,
    pagerank: HashMap<ConceptId, f64>,
    top: HashSet<ConceptId>,
    top_n: usize,
}

impl GraphStats {
    /// Compute PageRank (power iteration, damping 0.85) and record the
    /// top `top_n` nodes by score, ties resolving to the lower concept ID.
    pub fn compute(graph: &ConceptGraph, top_n: usize) -> Self {
        let pagerank = pagerank(graph);

        let mut ranked: Vec<(&ConceptId, &f64)> = pagerank.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let top = ranked
            .into_iter()
            .take(top_n)
            .map(|(id, _)| id.clone())
            .collect();

        let version = NEXT_VERSION.fetch_add(1, Ordering::Relaxed);
        tracing::info!(version, nodes = pagerank.len(), "computed pagerank snapshot");

        Self {
            version,
            pagerank,
            top,
            top_n,
        }
    }

    /// Snapshot version, monotonically increasing per process.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// PageRank score of a concept; 0.0 for unknown concepts.
    pub fn score(&self, id: &ConceptId) -> f64 {
        self.pagerank.get(id).copied().unwrap_or(0.0)
    }

    /// Whether a concept is among the top-N PageRank nodes.
    pub fn is_top(&self, id: &ConceptId) -> bool {
        self.top.contains(id)
    }

    /// The globally important nodes: top-N by PageRank, descending score,
    /// ties resolving to the lower concept ID.
    pub fn top_nodes(&self) -> Vec<ConceptId> {
        let mut nodes: Vec<ConceptId> = self.top.iter().cloned().collect();
        nodes.sort_by(|a, b| {
            self.score(b)
                .partial_cmp(&self.score(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        nodes
    }

    /// The configured top-N cutoff.
    pub fn top_n(&self) -> usize {
        self.top_n
    }
}

/// Power-iteration PageRank over the directed graph.
///
/// Dangling nodes spread their mass uniformly, so scores always sum to ~1.
fn pagerank(graph: &ConceptGraph) -> HashMap<ConceptId, f64> {
    let ids = graph.concept_ids();
    let n = ids.len();
    if n == 0 {
        return HashMap::new();
    }

    let out_links: HashMap<&ConceptId, Vec<ConceptId>> =
        ids.iter().map(|id| (id, graph.successors(id))).collect();

    let uniform = 1.0 / n as f64;
    let mut scores: HashMap<ConceptId, f64> =
        ids.iter().map(|id| (id.clone(), uniform)).collect();

    for _ in 0..MAX_ITERATIONS {
        let base = (1.0 - DAMPING) / n as f64;
        let mut next: HashMap<ConceptId, f64> =
            ids.iter().map(|id| (id.clone(), base)).collect();

        for id in &ids {
            let score = scores[id];
            let out = &out_links[id];
            if out.is_empty() {
                // Dangling: distribute everywhere
                let share = DAMPING * score / n as f64;
                for target in &ids {
                    *next.entry(target.clone()).or_insert(0.0) += share;
                }
            } else {
                let share = DAMPING * score / out.len() as f64;
                for target in out {
                    if let Some(entry) = next.get_mut(target) {
                        *entry += share;
                    }
                }
            }
        }

        let delta: f64 = ids
            .iter()
            .map(|id| (next[id] - scores[id]).abs())
            .sum();
        scores = next;
        if delta < TOLERANCE * n as f64 {
            break;
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Concept, Relationship};

    fn chain_graph() -> ConceptGraph {
        let graph = ConceptGraph::new();
        let a = graph.add_concept(Concept::new("1", "A"));
        let b = graph.add_concept(Concept::new("2", "B"));
        let c = graph.add_concept(Concept::new("3", "C"));
        let d = graph.add_concept(Concept::new("4", "D"));

        // Everything points at d
        graph.add_relationship(Relationship::new(a.clone(), d.clone(), "is_a")).unwrap();
        graph.add_relationship(Relationship::new(b, d.clone(), "is_a")).unwrap();
        graph.add_relationship(Relationship::new(c, d.clone(), "is_a")).unwrap();
        graph.add_relationship(Relationship::new(d, a, "associated_with")).unwrap();
        graph
    }

    #[test]
    fn test_scores_sum_to_one() {
        let graph = chain_graph();
        let stats = GraphStats::compute(&graph, 2);

        let total: f64 = graph
            .concept_ids()
            .iter()
            .map(|id| stats.score(id))
            .sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_sink_target_ranks_highest() {
        let graph = chain_graph();
        let stats = GraphStats::compute(&graph, 1);

        let top = stats.top_nodes();
        assert_eq!(top, vec![ConceptId::from("4")]);
        assert!(stats.is_top(&ConceptId::from("4")));
        assert!(!stats.is_top(&ConceptId::from("2")));
    }

    #[test]
    fn test_empty_graph() {
        let graph = ConceptGraph::new();
        let stats = GraphStats::compute(&graph, 10);
        assert!(stats.top_nodes().is_empty());
        assert_eq!(stats.score(&ConceptId::from("1")), 0.0);
    }

    #[test]
    fn test_versions_increase() {
        let graph = chain_graph();
        let first = GraphStats::compute(&graph, 2);
        let second = GraphStats::compute(&graph, 2);
        assert!(second.version() > first.version());
    }

    #[test]
    fn test_unknown_concept_scores_zero() {
        let graph = chain_graph();
        let stats = GraphStats::compute(&graph, 2);
        assert_eq!(stats.score(&ConceptId::from("missing")), 0.0);
    }
}
