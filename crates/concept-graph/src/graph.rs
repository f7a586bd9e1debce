//! Concept graph storage and data access.

use dashmap::DashMap;

use crate::ontology::{Concept, ConceptId, Relationship, SemanticTag};
use crate::{GraphError, Result};

/// Directed property graph of concepts and typed relationships.
///
/// Built once by the loader and read-only for the lifetime of all queries
/// that follow; concurrent reads are safe. Parallel edges of different
/// relationship types between the same pair are allowed.
#[derive(Debug)]
pub struct ConceptGraph {
    /// Concepts indexed by ID.
    concepts: DashMap<ConceptId, Concept>,
    /// Outgoing relationships: source -> [relationship].
    outgoing: DashMap<ConceptId, Vec<Relationship>>,
    /// Incoming relationships: target -> [relationship].
    incoming: DashMap<ConceptId, Vec<Relationship>>,
    /// Name to ID index for fast lookup.
    name_index: DashMap<String, ConceptId>,
}

impl ConceptGraph {
    /// Create a new empty concept graph.
    pub fn new() -> Self {
        Self {
            concepts: DashMap::new(),
            outgoing: DashMap::new(),
            incoming: DashMap::new(),
            name_index: DashMap::new(),
        }
    }

    /// Add a concept to the graph.
    pub fn add_concept(&self, concept: Concept) -> ConceptId {
        let id = concept.id.clone();
        self.name_index.insert(concept.name.clone(), id.clone());
        self.concepts.insert(id.clone(), concept);
        id
    }

    /// Get concept by ID.
    pub fn get_concept(&self, id: &ConceptId) -> Option<Concept> {
        self.concepts.get(id).map(|c| c.clone())
    }

    /// Get concept by preferred term.
    pub fn get_concept_by_name(&self, name: &str) -> Option<Concept> {
        self.name_index
            .get(name)
            .and_then(|id| self.concepts.get(&*id).map(|c| c.clone()))
    }

    /// Whether a concept exists.
    pub fn contains(&self, id: &ConceptId) -> bool {
        self.concepts.contains_key(id)
    }

    /// Semantic tag of a concept, if the concept exists and carries one.
    pub fn semantic_tag(&self, id: &ConceptId) -> Option<SemanticTag> {
        self.concepts
            .get(id)
            .and_then(|c| c.semantic_tag.clone())
    }

    /// Add a relationship between existing concepts.
    pub fn add_relationship(&self, rel: Relationship) -> Result<()> {
        if !self.concepts.contains_key(&rel.source) {
            return Err(GraphError::NodeNotFound(rel.source));
        }
        if !self.concepts.contains_key(&rel.target) {
            return Err(GraphError::NodeNotFound(rel.target));
        }

        self.outgoing
            .entry(rel.source.clone())
            .or_default()
            .push(rel.clone());
        self.incoming.entry(rel.target.clone()).or_default().push(rel);

        Ok(())
    }

    /// All relationships from a concept.
    pub fn outgoing(&self, id: &ConceptId) -> Vec<Relationship> {
        self.outgoing.get(id).map(|v| v.clone()).unwrap_or_default()
    }

    /// All relationships to a concept.
    pub fn incoming(&self, id: &ConceptId) -> Vec<Relationship> {
        self.incoming.get(id).map(|v| v.clone()).unwrap_or_default()
    }

    /// Targets of outgoing relationships, in insertion order.
    pub fn successors(&self, id: &ConceptId) -> Vec<ConceptId> {
        self.outgoing
            .get(id)
            .map(|v| v.iter().map(|r| r.target.clone()).collect())
            .unwrap_or_default()
    }

    /// Sources of incoming relationships, in insertion order.
    pub fn predecessors(&self, id: &ConceptId) -> Vec<ConceptId> {
        self.incoming
            .get(id)
            .map(|v| v.iter().map(|r| r.source.clone()).collect())
            .unwrap_or_default()
    }

    /// Neighbors in both directions: predecessors first, then successors.
    ///
    /// Ontology edges point in the direction of specialization/attribution;
    /// clinically relevant associations often require walking against that
    /// direction, so traversal treats the graph as undirected and this
    /// ordering is the one traversal observes.
    pub fn neighbors(&self, id: &ConceptId) -> Vec<ConceptId> {
        let mut out = self.predecessors(id);
        out.extend(self.successors(id));
        out
    }

    /// Total degree: incoming plus outgoing edge count.
    pub fn degree(&self, id: &ConceptId) -> usize {
        let outgoing = self.outgoing.get(id).map(|v| v.len()).unwrap_or(0);
        let incoming = self.incoming.get(id).map(|v| v.len()).unwrap_or(0);
        outgoing + incoming
    }

    /// Snapshot of all concept IDs, sorted for deterministic iteration.
    pub fn concept_ids(&self) -> Vec<ConceptId> {
        let mut ids: Vec<ConceptId> = self.concepts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of concepts in the graph.
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// Number of relationships in the graph.
    pub fn relationship_count(&self) -> usize {
        self.outgoing.iter().map(|e| e.len()).sum()
    }
}

impl Default for ConceptGraph {
    fn default() -> Self {
        Self::new()
    }
}
