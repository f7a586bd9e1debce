//! Bounded recursive subgraph search from resolved seed concepts.
//!
//! Depth-first, bidirectional traversal collecting every path worth keeping
//! under the include/stop tag policy, short-circuiting at hub concepts.
//! Implemented with an explicit work stack instead of native recursion so
//! depth is never limited by the call stack and traversal state stays
//! inspectable; exploration order matches the recursive formulation
//! node-for-node.

use std::collections::HashSet;

use crate::graph::ConceptGraph;
use crate::hubs::HubIndex;
use crate::ontology::{ConceptId, SemanticTag};
use crate::{GraphError, Result};

/// One DFS branch from a seed to a terminal node. No node repeats.
pub type SearchPath = Vec<ConceptId>;

/// Tag policy and depth bound for one subgraph search.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Record a path prefix only when the node's tag is in this set.
    /// Empty means record at every node. Recording does not stop a branch.
    pub include_tags: Vec<SemanticTag>,
    /// Record and terminate the branch when the node's tag is in this set.
    pub stop_tags: Vec<SemanticTag>,
    /// Maximum traversal depth; paths have at most `max_depth + 1` nodes.
    pub max_depth: usize,
}

impl SearchParams {
    /// Unfiltered search to the given depth.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }
}

/// Mutable traversal state for one logical query.
///
/// The visited set is shared across every seed of the query, not reset per
/// seed: a node reachable from two seeds is only explored from whichever
/// seed's traversal reaches it first, and later seeds see it as already
/// claimed. Queries must not share this state with each other.
#[derive(Debug, Default)]
pub struct TraversalState {
    visited: HashSet<ConceptId>,
    path: Vec<ConceptId>,
}

impl TraversalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes claimed so far across all seeds of this query.
    pub fn visited(&self) -> &HashSet<ConceptId> {
        &self.visited
    }
}

enum Frame {
    Visit(ConceptId, usize),
    Backtrack,
}

/// Collect all paths from `seed` under the given tag policy.
///
/// Per node, in order:
/// 1. already visited or too deep: prune the branch;
/// 2. stop tag: record the path and terminate the branch;
/// 3. hub: record the path and terminate the branch (hub fan-out would
///    explode the search and the paths through it carry little meaning);
/// 4. include policy: record the path, then keep walking;
/// 5. recurse into predecessors, then successors.
///
/// Untagged nodes never match a tag set. Returns `NodeNotFound` when the
/// seed is not in the graph; an empty path list is a normal outcome.
pub fn collect_paths(
    graph: &ConceptGraph,
    seed: &ConceptId,
    params: &SearchParams,
    hubs: &HubIndex,
    state: &mut TraversalState,
) -> Result<Vec<SearchPath>> {
    if !graph.contains(seed) {
        return Err(GraphError::NodeNotFound(seed.clone()));
    }

    let mut paths = Vec::new();
    let mut stack = vec![Frame::Visit(seed.clone(), 0)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Visit(node, depth) => {
                if state.visited.contains(&node) || depth > params.max_depth {
                    continue;
                }
                state.visited.insert(node.clone());
                state.path.push(node.clone());

                let tag = graph.semantic_tag(&node);

                let stopped_by_tag = !params.stop_tags.is_empty()
                    && tag.as_ref().is_some_and(|t| params.stop_tags.contains(t));
                if stopped_by_tag || hubs.contains(&node) {
                    paths.push(state.path.clone());
                    state.path.pop();
                    continue;
                }

                if params.include_tags.is_empty()
                    || tag.as_ref().is_some_and(|t| params.include_tags.contains(t))
                {
                    paths.push(state.path.clone());
                }

                stack.push(Frame::Backtrack);
                for neighbor in graph.neighbors(&node).into_iter().rev() {
                    stack.push(Frame::Visit(neighbor, depth + 1));
                }
            }
            Frame::Backtrack => {
                state.path.pop();
            }
        }
    }

    tracing::debug!(seed = %seed, paths = paths.len(), "collected paths");
    Ok(paths)
}
