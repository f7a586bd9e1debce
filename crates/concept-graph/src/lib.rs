//! # medgraph Concept Graph
//!
//! Semantic subgraph retrieval over a biomedical concept graph built from
//! ontology sources (SNOMED CT, UMLS, RxNorm, MeSH, DrugBank and friends).
//!
//! This crate provides:
//! - Typed concepts and relationships with SNOMED-style semantic tags
//! - Nearest-neighbor term resolution over a vector index
//! - Hub-aware bounded traversal collecting paths from resolved seeds
//! - Path-union subgraph composition and connected-component extraction
//! - Importance ranking (local degree, global PageRank, semantic clustering)
//!
//! The graph, hub set, and PageRank snapshot are built once at load time and
//! are read-only afterwards; every query gets its own traversal state.

pub mod ontology;
pub mod graph;
pub mod hubs;
pub mod stats;
pub mod resolver;
pub mod traversal;
pub mod compose;
pub mod components;
pub mod neighborhood;
pub mod rank;
pub mod retrieval;
pub mod io;

pub use ontology::{Concept, ConceptId, RelationType, Relationship, SemanticTag, SEMANTIC_TAGS};
pub use graph::ConceptGraph;
pub use hubs::HubIndex;
pub use stats::GraphStats;
pub use resolver::{ConceptResolver, SimilarityResult};
pub use traversal::{collect_paths, SearchParams, SearchPath, TraversalState};
pub use compose::ResultSubgraph;
pub use rank::{rank_concepts, RankOptions};
pub use retrieval::{
    related_subgraphs, related_subgraphs_for_terms, Embedder, RelatedSubgraph, RetrievalConfig,
};
pub use io::GraphDump;

/// Error types for concept graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Concept not found: {0}")]
    NodeNotFound(ConceptId),

    #[error("Unknown semantic tag: {0:?}")]
    UnknownSemanticTag(String),

    #[error("Embedding provider error: {0}")]
    Embedding(String),

    #[error(transparent)]
    Vector(#[from] vector_index::VectorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed graph dump: {0}")]
    Dump(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
