//! Connected-component extraction over composed result subgraphs.
//!
//! Callers keep the most relevant region of a composed graph: the largest
//! component outright, or the one best covering the originally resolved
//! seeds. All selections break ties deterministically: among components of
//! equal score, the one containing the lowest concept ID wins.

use std::collections::{BTreeSet, HashSet};

use crate::compose::ResultSubgraph;
use crate::ontology::ConceptId;

/// Largest component under undirected connectivity.
pub fn largest_connected_component(graph: &ResultSubgraph) -> ResultSubgraph {
    let component = pick_largest(undirected_components(graph));
    extract(graph, component)
}

/// Largest weakly connected component of the directed graph.
///
/// Weak connectivity ignores edge direction, so this coincides with
/// [`largest_connected_component`]; both names survive because callers of
/// the directed API expect the directed vocabulary.
pub fn largest_weakly_connected_component(graph: &ResultSubgraph) -> ResultSubgraph {
    largest_connected_component(graph)
}

/// Largest strongly connected component of the directed graph.
pub fn largest_strongly_connected_component(graph: &ResultSubgraph) -> ResultSubgraph {
    let component = pick_largest(strongly_connected_components(graph));
    extract(graph, component)
}

/// Largest attracting component: a strongly connected component with no
/// edges leaving it. Clinically, downstream-consequence concepts tend to
/// pool in these sink regions.
pub fn largest_attracting_component(graph: &ResultSubgraph) -> ResultSubgraph {
    let attracting = strongly_connected_components(graph)
        .into_iter()
        .filter(|scc| {
            scc.iter().all(|node| {
                graph
                    .successors(node)
                    .iter()
                    .all(|target| scc.contains(target))
            })
        })
        .collect();
    let component = pick_largest(attracting);
    extract(graph, component)
}

/// Among all (undirected) components, the one maximizing overlap with
/// `targets` — coverage of the resolved seeds, not raw size. Returns an
/// empty graph when no component intersects `targets`.
pub fn largest_component_containing_nodes(
    graph: &ResultSubgraph,
    targets: &BTreeSet<ConceptId>,
) -> ResultSubgraph {
    let mut best: Option<(BTreeSet<ConceptId>, usize)> = None;

    for component in undirected_components(graph) {
        let overlap = component.intersection(targets).count();
        if overlap == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((current, current_overlap)) => {
                overlap > *current_overlap
                    || (overlap == *current_overlap && component.first() < current.first())
            }
        };
        if better {
            best = Some((component, overlap));
        }
    }

    match best {
        Some((component, _)) => extract(graph, Some(component)),
        None => {
            tracing::info!("no component contains any of the given nodes");
            ResultSubgraph::new()
        }
    }
}

/// All components under undirected connectivity, each sorted internally;
/// discovered in ascending order of their lowest node id.
fn undirected_components(graph: &ResultSubgraph) -> Vec<BTreeSet<ConceptId>> {
    let mut components = Vec::new();
    let mut seen: HashSet<ConceptId> = HashSet::new();

    for start in graph.nodes() {
        if seen.contains(start) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut stack = vec![start.clone()];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.clone()) {
                continue;
            }
            for neighbor in graph.undirected_neighbors(&node) {
                if !seen.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
            component.insert(node);
        }
        components.push(component);
    }

    components
}

/// Strongly connected components via iterative Kosaraju: one DFS pass for
/// finish order, one pass over the transpose.
fn strongly_connected_components(graph: &ResultSubgraph) -> Vec<BTreeSet<ConceptId>> {
    enum Frame {
        Enter(ConceptId),
        Exit(ConceptId),
    }

    // Pass 1: finish order over out-edges
    let mut finished: Vec<ConceptId> = Vec::new();
    let mut seen: HashSet<ConceptId> = HashSet::new();
    for start in graph.nodes() {
        if seen.contains(start) {
            continue;
        }
        let mut stack = vec![Frame::Enter(start.clone())];
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if !seen.insert(node.clone()) {
                        continue;
                    }
                    stack.push(Frame::Exit(node.clone()));
                    for target in graph.successors(&node) {
                        if !seen.contains(&target) {
                            stack.push(Frame::Enter(target));
                        }
                    }
                }
                Frame::Exit(node) => finished.push(node),
            }
        }
    }

    // Pass 2: walk the transpose in reverse finish order
    let mut components = Vec::new();
    let mut assigned: HashSet<ConceptId> = HashSet::new();
    for root in finished.into_iter().rev() {
        if assigned.contains(&root) {
            continue;
        }
        let mut component = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !assigned.insert(node.clone()) {
                continue;
            }
            for source in graph.predecessors(&node) {
                if !assigned.contains(&source) {
                    stack.push(source);
                }
            }
            component.insert(node);
        }
        components.push(component);
    }

    components
}

/// Largest component; equal sizes resolve to the one with the lowest id.
fn pick_largest(components: Vec<BTreeSet<ConceptId>>) -> Option<BTreeSet<ConceptId>> {
    let mut best: Option<BTreeSet<ConceptId>> = None;
    for component in components {
        let better = match &best {
            None => true,
            Some(current) => {
                component.len() > current.len()
                    || (component.len() == current.len() && component.first() < current.first())
            }
        };
        if better {
            best = Some(component);
        }
    }
    best
}

fn extract(graph: &ResultSubgraph, component: Option<BTreeSet<ConceptId>>) -> ResultSubgraph {
    let result = match component {
        Some(nodes) => graph.induced(&nodes),
        None => ResultSubgraph::new(),
    };
    tracing::info!(
        nodes = result.node_count(),
        edges = result.edge_count(),
        "extracted component"
    );
    result
}
