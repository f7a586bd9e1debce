//! Graph dump loading and saving.
//!
//! ETL produces one JSON document holding concepts, relationships, and
//! concept embeddings; it is loaded once at boot and everything derived
//! from it (graph, resolver, hubs, stats) is read-only afterwards.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use vector_index::Embedding;

use crate::graph::ConceptGraph;
use crate::ontology::{Concept, ConceptId, Relationship};
use crate::resolver::ConceptResolver;
use crate::Result;

/// One embedded concept in the dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRow {
    pub concept_id: ConceptId,
    pub vector: Vec<f32>,
}

/// The on-disk graph produced by ontology ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDump {
    pub concepts: Vec<Concept>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub embeddings: Vec<EmbeddingRow>,
}

impl GraphDump {
    /// Read a dump from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let dump = serde_json::from_reader(BufReader::new(file))?;
        Ok(dump)
    }

    /// Write the dump to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Export the structure of a graph (concepts and relationships).
    pub fn from_graph(graph: &ConceptGraph) -> Self {
        let ids = graph.concept_ids();
        let concepts = ids.iter().filter_map(|id| graph.get_concept(id)).collect();
        let relationships = ids.iter().flat_map(|id| graph.outgoing(id)).collect();
        Self {
            concepts,
            relationships,
            embeddings: Vec::new(),
        }
    }

    /// Build the in-memory concept graph.
    ///
    /// Fails with `NodeNotFound` when a relationship references a concept
    /// the dump does not define.
    pub fn build_graph(&self) -> Result<ConceptGraph> {
        let graph = ConceptGraph::new();
        for concept in &self.concepts {
            graph.add_concept(concept.clone());
        }
        for relationship in &self.relationships {
            graph.add_relationship(relationship.clone())?;
        }
        tracing::info!(
            concepts = graph.concept_count(),
            relationships = graph.relationship_count(),
            "built concept graph from dump"
        );
        Ok(graph)
    }

    /// Build the resolver from the embedding rows.
    ///
    /// Rows whose vector length differs from `dim` fail with
    /// `DimensionMismatch`.
    pub fn build_resolver(&self, dim: usize) -> Result<ConceptResolver> {
        let mut resolver = ConceptResolver::new(dim);
        for row in &self.embeddings {
            resolver.register(row.concept_id.clone(), Embedding::new(row.vector.clone()))?;
        }
        tracing::info!(vectors = resolver.len(), dim, "built concept resolver from dump");
        Ok(resolver)
    }

    /// Dimension of the first embedding row, if any.
    pub fn embedding_dim(&self) -> Option<usize> {
        self.embeddings.first().map(|row| row.vector.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::SemanticTag;
    use vector_index::VectorError;

    fn sample_dump() -> GraphDump {
        GraphDump {
            concepts: vec![
                Concept::new("1", "Chest pain")
                    .with_tag(SemanticTag::parse("finding").unwrap()),
                Concept::new("2", "Angina"),
            ],
            relationships: vec![Relationship::new("1", "2", "associated_with").with_group(0)],
            embeddings: vec![
                EmbeddingRow {
                    concept_id: ConceptId::from("1"),
                    vector: vec![1.0, 0.0],
                },
                EmbeddingRow {
                    concept_id: ConceptId::from("2"),
                    vector: vec![0.0, 1.0],
                },
            ],
        }
    }

    #[test]
    fn test_build_graph_and_resolver() {
        let dump = sample_dump();
        let graph = dump.build_graph().unwrap();
        assert_eq!(graph.concept_count(), 2);
        assert_eq!(graph.relationship_count(), 1);

        let resolver = dump.build_resolver(dump.embedding_dim().unwrap()).unwrap();
        assert_eq!(resolver.len(), 2);
        assert!(resolver.contains(&ConceptId::from("1")));
    }

    #[test]
    fn test_dangling_relationship_is_error() {
        let mut dump = sample_dump();
        dump.relationships
            .push(Relationship::new("2", "404", "is_a"));

        let err = dump.build_graph().unwrap_err();
        assert!(matches!(err, crate::GraphError::NodeNotFound(_)));
    }

    #[test]
    fn test_mismatched_embedding_dim_is_error() {
        let dump = sample_dump();
        let err = dump.build_resolver(3).unwrap_err();
        assert!(matches!(
            err,
            crate::GraphError::Vector(VectorError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let dump = sample_dump();
        dump.save(&path).unwrap();
        let loaded = GraphDump::load(&path).unwrap();

        assert_eq!(loaded.concepts.len(), 2);
        assert_eq!(loaded.relationships.len(), 1);
        assert_eq!(loaded.embeddings.len(), 2);
        assert_eq!(loaded.embedding_dim(), Some(2));
    }

    #[test]
    fn test_export_round_trip_preserves_structure() {
        let dump = sample_dump();
        let graph = dump.build_graph().unwrap();

        let exported = GraphDump::from_graph(&graph);
        let rebuilt = exported.build_graph().unwrap();

        assert_eq!(rebuilt.concept_count(), graph.concept_count());
        assert_eq!(rebuilt.relationship_count(), graph.relationship_count());
        assert_eq!(
            rebuilt.successors(&ConceptId::from("1")),
            vec![ConceptId::from("2")]
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GraphDump::load("/nonexistent/graph.json").unwrap_err();
        assert!(matches!(err, crate::GraphError::Io(_)));
    }
}
