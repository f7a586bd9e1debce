//! Ontology types for the concept graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// Opaque concept identifier.
///
/// Source-dependent: SNOMED CT SCTIDs are numeric strings, UMLS CUIs look
/// like `C0008031`. The core never interprets the contents; `Ord` exists so
/// tie-breaks can be deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConceptId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ConceptId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ConceptId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// The SNOMED CT semantic tag vocabulary.
///
/// Concepts carry at most one of these; traversal include/stop sets are
/// validated against this list at construction.
pub const SEMANTIC_TAGS: &[&str] = &[
    "body structure",
    "cell",
    "cell structure",
    "morphologic abnormality",
    "finding",
    "disorder",
    "environment",
    "geographic location",
    "event",
    "observable entity",
    "organism",
    "clinical drug",
    "medicinal product",
    "medicinal product form",
    "physical object",
    "product",
    "physical force",
    "procedure",
    "regime/therapy",
    "qualifier value",
    "administration method",
    "basic dose form",
    "disposition",
    "dose form",
    "intended site",
    "number",
    "product name",
    "release characteristic",
    "role",
    "state of matter",
    "transformation",
    "supplier",
    "unit of presentation",
    "record artifact",
    "situation",
    "attribute",
    "core metadata concept",
    "foundation metadata concept",
    "link assertion",
    "linkage concept",
    "namespace concept",
    "OWL metadata concept",
    "social concept",
    "ethnic group",
    "life style",
    "occupation",
    "person",
    "racial group",
    "religion/philosophy",
    "inactive concept",
    "navigational concept",
    "specimen",
    "staging scale",
    "assessment scale",
    "tumor staging",
    "substance",
];

/// A validated semantic tag.
///
/// Construction fails on strings outside [`SEMANTIC_TAGS`]; an unrecognized
/// tag is a configuration error, not a silent no-match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticTag(String);

impl SemanticTag {
    /// Parse and validate a tag against the controlled vocabulary.
    pub fn parse(tag: &str) -> Result<Self> {
        if SEMANTIC_TAGS.contains(&tag) {
            Ok(Self(tag.to_owned()))
        } else {
            Err(GraphError::UnknownSemanticTag(tag.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemanticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SemanticTag {
    type Error = GraphError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SemanticTag> for String {
    fn from(tag: SemanticTag) -> Self {
        tag.0
    }
}

/// A concept in the ontology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    /// Source-assigned identifier.
    pub id: ConceptId,
    /// Preferred term.
    pub name: String,
    /// Semantic category, when the source row carried one.
    pub semantic_tag: Option<SemanticTag>,
    /// Source-specific metadata (definitions, synonyms); uninterpreted.
    pub metadata: Option<serde_json::Value>,
    /// Vector id in the embedding index, when this concept was embedded.
    pub embedding_id: Option<u64>,
}

impl Concept {
    /// Create a new concept.
    pub fn new(id: impl Into<ConceptId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            semantic_tag: None,
            metadata: None,
            embedding_id: None,
        }
    }

    /// Set the semantic tag.
    pub fn with_tag(mut self, tag: SemanticTag) -> Self {
        self.semantic_tag = Some(tag);
        self
    }

    /// Attach source metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Link to a vector in the embedding index.
    pub fn with_embedding_id(mut self, embedding_id: u64) -> Self {
        self.embedding_id = Some(embedding_id);
        self
    }
}

/// Type of a relationship, as named by the source ontology.
///
/// Ontologies define hundreds of these ("is_a", "finding_site",
/// "causative_agent", ...); the core treats them as opaque labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationType(String);

impl RelationType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationType {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A directed relationship between two concepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Source concept.
    pub source: ConceptId,
    /// Target concept.
    pub target: ConceptId,
    /// Kind of relationship.
    pub relation_type: RelationType,
    /// Relationship group: bundles co-occurring attribute edges into one
    /// logical relationship, per source ontology semantics.
    pub group: Option<u32>,
}

impl Relationship {
    /// Create a new relationship.
    pub fn new(
        source: impl Into<ConceptId>,
        target: impl Into<ConceptId>,
        relation_type: impl Into<RelationType>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation_type: relation_type.into(),
            group: None,
        }
    }

    /// Set the relationship group.
    pub fn with_group(mut self, group: u32) -> Self {
        self.group = Some(group);
        self
    }
}
