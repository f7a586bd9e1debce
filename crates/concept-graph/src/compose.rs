//! Composition of per-seed path sets into one working subgraph.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::ontology::ConceptId;
use crate::traversal::SearchPath;

/// A derived directed graph assembled from traversal paths.
///
/// Holds structure only: node ids and deduplicated `(source, target)`
/// edges. Ontology attributes stay in the parent [`crate::ConceptGraph`]
/// and are looked up there. BTree-backed adjacency keeps iteration in
/// concept-id order, which the component tie-breaks rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSubgraph {
    nodes: BTreeSet<ConceptId>,
    out: BTreeMap<ConceptId, BTreeSet<ConceptId>>,
    inc: BTreeMap<ConceptId, BTreeSet<ConceptId>>,
}

impl ResultSubgraph {
    /// An empty subgraph: the valid "nothing related found" result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of the edge sets of all given paths.
    ///
    /// Each path contributes its consecutive pairs; repeated edges
    /// contribute once, so composition is idempotent. Paths of a single
    /// node carry no edges and contribute nothing, matching edge-set
    /// semantics.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a SearchPath>) -> Self {
        let mut graph = Self::new();
        for path in paths {
            for pair in path.windows(2) {
                graph.add_edge(pair[0].clone(), pair[1].clone());
            }
        }
        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "composed result graph"
        );
        graph
    }

    /// Like [`Self::from_paths`], but drops paths that touch no seed:
    /// branches that drifted entirely away from every resolved concept.
    pub fn from_paths_touching<'a>(
        paths: impl IntoIterator<Item = &'a SearchPath>,
        seeds: &HashSet<ConceptId>,
    ) -> Self {
        Self::from_paths(
            paths
                .into_iter()
                .filter(|path| path.iter().any(|node| seeds.contains(node))),
        )
    }

    /// Intersection of several subgraphs: the nodes common to all of them
    /// and the edges present in every one. Empty input yields an empty
    /// graph.
    pub fn intersection(subgraphs: &[ResultSubgraph]) -> Self {
        let Some((first, rest)) = subgraphs.split_first() else {
            return Self::new();
        };

        let mut result = Self::new();
        for node in first.nodes() {
            if rest.iter().all(|g| g.contains_node(node)) {
                result.add_node(node.clone());
            }
        }
        for (source, target) in first.edges() {
            if result.contains_node(&source)
                && result.contains_node(&target)
                && rest.iter().all(|g| g.contains_edge(&source, &target))
            {
                result.add_edge(source, target);
            }
        }
        result
    }

    /// Add an isolated node.
    pub fn add_node(&mut self, id: ConceptId) {
        self.nodes.insert(id);
    }

    /// Add a directed edge, inserting both endpoints.
    pub fn add_edge(&mut self, source: ConceptId, target: ConceptId) {
        self.nodes.insert(source.clone());
        self.nodes.insert(target.clone());
        self.out.entry(source.clone()).or_default().insert(target.clone());
        self.inc.entry(target).or_default().insert(source);
    }

    pub fn contains_node(&self, id: &ConceptId) -> bool {
        self.nodes.contains(id)
    }

    pub fn contains_edge(&self, source: &ConceptId, target: &ConceptId) -> bool {
        self.out
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &ConceptId> {
        self.nodes.iter()
    }

    /// Edges in ascending (source, target) order.
    pub fn edges(&self) -> Vec<(ConceptId, ConceptId)> {
        self.out
            .iter()
            .flat_map(|(source, targets)| {
                targets
                    .iter()
                    .map(move |target| (source.clone(), target.clone()))
            })
            .collect()
    }

    /// Out-neighbors in ascending id order.
    pub fn successors(&self, id: &ConceptId) -> Vec<ConceptId> {
        self.out
            .get(id)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// In-neighbors in ascending id order.
    pub fn predecessors(&self, id: &ConceptId) -> Vec<ConceptId> {
        self.inc
            .get(id)
            .map(|sources| sources.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Neighbors ignoring direction, deduplicated, ascending.
    pub fn undirected_neighbors(&self, id: &ConceptId) -> Vec<ConceptId> {
        let mut neighbors: BTreeSet<ConceptId> = BTreeSet::new();
        if let Some(targets) = self.out.get(id) {
            neighbors.extend(targets.iter().cloned());
        }
        if let Some(sources) = self.inc.get(id) {
            neighbors.extend(sources.iter().cloned());
        }
        neighbors.into_iter().collect()
    }

    /// Degree within this subgraph, counting both directions.
    pub fn degree(&self, id: &ConceptId) -> usize {
        let out = self.out.get(id).map(|s| s.len()).unwrap_or(0);
        let inc = self.inc.get(id).map(|s| s.len()).unwrap_or(0);
        out + inc
    }

    /// The induced subgraph on `keep`: those nodes plus all edges between
    /// them.
    pub fn induced(&self, keep: &BTreeSet<ConceptId>) -> Self {
        let mut sub = Self::new();
        for node in self.nodes.intersection(keep) {
            sub.add_node(node.clone());
        }
        for (source, targets) in &self.out {
            if !keep.contains(source) {
                continue;
            }
            for target in targets {
                if keep.contains(target) {
                    sub.add_edge(source.clone(), target.clone());
                }
            }
        }
        sub
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out.values().map(|targets| targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
