//! Local neighborhood operations on the concept graph.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::compose::ResultSubgraph;
use crate::graph::ConceptGraph;
use crate::ontology::ConceptId;
use crate::{GraphError, Result};

/// The induced subgraph of all nodes within `radius` undirected hops of
/// `center`, center included.
pub fn ego_graph(
    graph: &ConceptGraph,
    center: &ConceptId,
    radius: usize,
) -> Result<ResultSubgraph> {
    if !graph.contains(center) {
        return Err(GraphError::NodeNotFound(center.clone()));
    }

    let mut members: BTreeSet<ConceptId> = BTreeSet::new();
    let mut queue = VecDeque::new();
    queue.push_back((center.clone(), 0usize));
    members.insert(center.clone());

    while let Some((node, depth)) = queue.pop_front() {
        if depth >= radius {
            continue;
        }
        for neighbor in graph.neighbors(&node) {
            if members.insert(neighbor.clone()) {
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    let mut ego = ResultSubgraph::new();
    for node in &members {
        ego.add_node(node.clone());
        for target in graph.successors(node) {
            if members.contains(&target) {
                ego.add_edge(node.clone(), target);
            }
        }
    }
    Ok(ego)
}

/// Locally important nodes: the n-hop ego graph members ordered by their
/// degree within that ego graph, descending; ties resolve to the lower id.
pub fn local_important_nodes(
    graph: &ConceptGraph,
    node: &ConceptId,
    n: usize,
) -> Result<Vec<ConceptId>> {
    let ego = ego_graph(graph, node, n)?;
    let mut members: Vec<ConceptId> = ego.nodes().cloned().collect();
    members.sort_by(|a, b| ego.degree(b).cmp(&ego.degree(a)).then_with(|| a.cmp(b)));
    Ok(members)
}

/// Shortest directed hop-path from `source` to `target` (BFS), or `None`
/// when `target` is unreachable.
pub fn shortest_path(
    graph: &ConceptGraph,
    source: &ConceptId,
    target: &ConceptId,
) -> Result<Option<Vec<ConceptId>>> {
    for node in [source, target] {
        if !graph.contains(node) {
            return Err(GraphError::NodeNotFound(node.clone()));
        }
    }

    if source == target {
        return Ok(Some(vec![source.clone()]));
    }

    let mut parent: HashMap<ConceptId, ConceptId> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut seen: HashSet<ConceptId> = HashSet::new();
    queue.push_back(source.clone());
    seen.insert(source.clone());

    while let Some(node) = queue.pop_front() {
        for next in graph.successors(&node) {
            if !seen.insert(next.clone()) {
                continue;
            }
            parent.insert(next.clone(), node.clone());
            if &next == target {
                let mut path = vec![target.clone()];
                let mut current = target;
                while let Some(prev) = parent.get(current) {
                    path.push(prev.clone());
                    current = prev;
                }
                path.reverse();
                return Ok(Some(path));
            }
            queue.push_back(next);
        }
    }

    Ok(None)
}

/// Concepts that both `a` and `b` point at (shared out-neighbors), in
/// ascending id order.
pub fn common_neighbors(
    graph: &ConceptGraph,
    a: &ConceptId,
    b: &ConceptId,
) -> Result<Vec<ConceptId>> {
    for node in [a, b] {
        if !graph.contains(node) {
            return Err(GraphError::NodeNotFound(node.clone()));
        }
    }

    let of_a: BTreeSet<ConceptId> = graph.successors(a).into_iter().collect();
    let of_b: BTreeSet<ConceptId> = graph.successors(b).into_iter().collect();
    Ok(of_a.intersection(&of_b).cloned().collect())
}

/// Spread unit mass from `start` across out-neighbors for `steps` rounds.
///
/// Mass at a node splits evenly over its successors each round; nodes with
/// no successors hold nothing into the next round (mass drains, as in the
/// original diffusion endpoint). Result is sorted by mass descending, ties
/// by id.
pub fn diffusion(
    graph: &ConceptGraph,
    start: &ConceptId,
    steps: usize,
) -> Result<Vec<(ConceptId, f64)>> {
    if !graph.contains(start) {
        return Err(GraphError::NodeNotFound(start.clone()));
    }

    let mut mass: HashMap<ConceptId, f64> = HashMap::from([(start.clone(), 1.0)]);

    for _ in 0..steps {
        let mut next: HashMap<ConceptId, f64> = HashMap::new();
        for (node, value) in &mass {
            let successors = graph.successors(node);
            if successors.is_empty() {
                continue;
            }
            let flow = value / successors.len() as f64;
            for target in successors {
                *next.entry(target).or_insert(0.0) += flow;
            }
        }
        mass = next;
    }

    let mut result: Vec<(ConceptId, f64)> = mass.into_iter().collect();
    result.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Concept, Relationship};

    fn id(s: &str) -> ConceptId {
        ConceptId::from(s)
    }

    /// 1 -> 2 -> 3 -> 4, plus 2 -> 5
    fn sample_graph() -> ConceptGraph {
        let graph = ConceptGraph::new();
        for i in 1..=5 {
            graph.add_concept(Concept::new(i.to_string(), format!("N{i}")));
        }
        graph.add_relationship(Relationship::new("1", "2", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("2", "3", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("3", "4", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("2", "5", "is_a")).unwrap();
        graph
    }

    #[test]
    fn test_ego_graph_radius_one() {
        let graph = sample_graph();
        let ego = ego_graph(&graph, &id("2"), 1).unwrap();

        // 2 plus neighbors 1, 3, 5 in either direction
        assert_eq!(ego.node_count(), 4);
        assert!(ego.contains_edge(&id("1"), &id("2")));
        assert!(ego.contains_edge(&id("2"), &id("3")));
        assert!(!ego.contains_node(&id("4")));
    }

    #[test]
    fn test_ego_graph_radius_zero_is_center_only() {
        let graph = sample_graph();
        let ego = ego_graph(&graph, &id("2"), 0).unwrap();
        assert_eq!(ego.node_count(), 1);
        assert_eq!(ego.edge_count(), 0);
    }

    #[test]
    fn test_local_important_nodes_sorted_by_ego_degree() {
        let graph = sample_graph();
        let important = local_important_nodes(&graph, &id("2"), 1).unwrap();

        // Node 2 touches 1, 3, 5 inside its ego graph; everything else
        // touches only node 2.
        assert_eq!(important[0], id("2"));
        assert_eq!(important.len(), 4);
        // Degree-1 members tie; lowest ids first
        assert_eq!(&important[1..], &[id("1"), id("3"), id("5")]);
    }

    #[test]
    fn test_shortest_path_directed() {
        let graph = sample_graph();
        let path = shortest_path(&graph, &id("1"), &id("4")).unwrap().unwrap();
        assert_eq!(path, vec![id("1"), id("2"), id("3"), id("4")]);

        // Against edge direction there is no path
        assert!(shortest_path(&graph, &id("4"), &id("1")).unwrap().is_none());
    }

    #[test]
    fn test_shortest_path_trivial_and_missing() {
        let graph = sample_graph();
        assert_eq!(
            shortest_path(&graph, &id("3"), &id("3")).unwrap().unwrap(),
            vec![id("3")]
        );
        assert!(matches!(
            shortest_path(&graph, &id("1"), &id("99")),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_common_neighbors() {
        let graph = ConceptGraph::new();
        for i in 1..=4 {
            graph.add_concept(Concept::new(i.to_string(), format!("N{i}")));
        }
        graph.add_relationship(Relationship::new("1", "3", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("2", "3", "is_a")).unwrap();
        graph.add_relationship(Relationship::new("1", "4", "is_a")).unwrap();

        let common = common_neighbors(&graph, &id("1"), &id("2")).unwrap();
        assert_eq!(common, vec![id("3")]);
    }

    #[test]
    fn test_diffusion_conserves_mass_through_splits() {
        let graph = sample_graph();
        let spread = diffusion(&graph, &id("1"), 2).unwrap();

        // After two steps from 1: mass sits at 3 and 5, split evenly
        let total: f64 = spread.iter().map(|(_, m)| m).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(spread.len(), 2);
        assert!(spread.iter().any(|(n, m)| n == &id("3") && (*m - 0.5).abs() < 1e-9));
        assert!(spread.iter().any(|(n, m)| n == &id("5") && (*m - 0.5).abs() < 1e-9));
    }

    #[test]
    fn test_diffusion_drains_at_sinks() {
        let graph = sample_graph();
        // Node 4 is a sink; by step 4 everything routed through it is gone
        let spread = diffusion(&graph, &id("1"), 4).unwrap();
        let total: f64 = spread.iter().map(|(_, m)| m).sum();
        assert!(total < 1.0);
    }
}
