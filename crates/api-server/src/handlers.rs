//! Request handlers for API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use concept_graph::{
    collect_paths, components, neighborhood, rank_concepts, related_subgraphs, Concept,
    ConceptGraph, ConceptId, ConceptResolver, GraphDump, GraphError, GraphStats, HubIndex,
    RankOptions, ResultSubgraph, RetrievalConfig, SearchParams, SearchPath, SemanticTag,
    TraversalState,
};
use vector_index::Embedding;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state: the loaded graph plus everything derived from
/// it at boot. All of it is read-only once built, so handlers never lock.
pub struct AppState {
    pub graph: ConceptGraph,
    pub resolver: ConceptResolver,
    pub hubs: HubIndex,
    pub stats: GraphStats,
}

impl AppState {
    /// Build the full state from an ingested graph dump.
    pub fn from_dump(
        dump: &GraphDump,
        dim: usize,
        pagerank_top_n: usize,
    ) -> concept_graph::Result<Self> {
        let graph = dump.build_graph()?;
        let resolver = dump.build_resolver(dim)?;
        let hubs = HubIndex::compute(&graph);
        let stats = GraphStats::compute(&graph, pagerank_top_n);

        tracing::info!(
            concepts = graph.concept_count(),
            relationships = graph.relationship_count(),
            vectors = resolver.len(),
            hubs = hubs.len(),
            "application state ready"
        );
        Ok(Self {
            graph,
            resolver,
            hubs,
            stats,
        })
    }

    /// Empty state for servers started without a dump.
    pub fn empty(dim: usize) -> Self {
        let graph = ConceptGraph::new();
        let hubs = HubIndex::compute(&graph);
        let stats = GraphStats::compute(&graph, 0);
        Self {
            graph,
            resolver: ConceptResolver::new(dim),
            hubs,
            stats,
        }
    }
}

pub type SharedState = Arc<AppState>;

type ApiError = (StatusCode, Json<serde_json::Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error_response(err: GraphError) -> ApiError {
    let status = match &err {
        GraphError::NodeNotFound(_) => StatusCode::NOT_FOUND,
        GraphError::UnknownSemanticTag(_) | GraphError::Vector(_) => StatusCode::BAD_REQUEST,
        GraphError::Embedding(_) => StatusCode::BAD_GATEWAY,
        GraphError::Io(_) | GraphError::Dump(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

fn parse_tags(tags: &[String]) -> Result<Vec<SemanticTag>, ApiError> {
    tags.iter()
        .map(|t| SemanticTag::parse(t).map_err(error_response))
        .collect()
}

/// Comma-separated tag list from a query string.
fn parse_tag_list(raw: &Option<String>) -> Result<Vec<SemanticTag>, ApiError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| SemanticTag::parse(t).map_err(error_response))
            .collect(),
    }
}

fn require_node(state: &AppState, id: &ConceptId) -> Result<(), ApiError> {
    if state.graph.contains(id) {
        Ok(())
    } else {
        Err(error_response(GraphError::NodeNotFound(id.clone())))
    }
}

#[derive(Debug, Serialize)]
pub struct SubgraphResponse {
    pub nodes: Vec<ConceptId>,
    pub edges: Vec<(ConceptId, ConceptId)>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl SubgraphResponse {
    fn from_subgraph(graph: &ResultSubgraph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
        }
    }
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "concepts": state.graph.concept_count(),
        "relationships": state.graph.relationship_count(),
        "vectors": state.resolver.len(),
        "dimension": state.resolver.dim(),
        "hubs": state.hubs.len(),
        "pagerank_version": state.stats.version(),
        "pagerank_top_n": state.stats.top_n(),
    }))
}

// ============================================================================
// Text and Metadata Search
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TextSearchQuery {
    pub query: String,
    pub limit: Option<usize>,
}

fn concept_matches(concept: &Concept, needle: &str) -> bool {
    if concept.name.to_lowercase().contains(needle) {
        return true;
    }
    if let Some(tag) = &concept.semantic_tag {
        if tag.as_str().contains(needle) {
            return true;
        }
    }
    concept
        .metadata
        .as_ref()
        .is_some_and(|m| m.to_string().to_lowercase().contains(needle))
}

/// Substring search over concept names, tags, and metadata.
pub async fn search_nodes(
    State(state): State<SharedState>,
    Query(params): Query<TextSearchQuery>,
) -> Json<Vec<Concept>> {
    let needle = params.query.to_lowercase();
    let limit = params.limit.unwrap_or(10);

    let mut results = Vec::new();
    for id in state.graph.concept_ids() {
        if let Some(concept) = state.graph.get_concept(&id) {
            if concept_matches(&concept, &needle) {
                results.push(concept);
                if results.len() >= limit {
                    break;
                }
            }
        }
    }
    Json(results)
}

#[derive(Debug, Serialize)]
pub struct RankedConcept {
    pub concept: Concept,
    pub rank: f64,
}

/// Substring search ordered by global PageRank.
pub async fn ranked_search(
    State(state): State<SharedState>,
    Query(params): Query<TextSearchQuery>,
) -> Json<Vec<RankedConcept>> {
    let needle = params.query.to_lowercase();
    let limit = params.limit.unwrap_or(10);

    let mut results: Vec<RankedConcept> = state
        .graph
        .concept_ids()
        .into_iter()
        .filter_map(|id| state.graph.get_concept(&id))
        .filter(|concept| concept_matches(concept, &needle))
        .map(|concept| {
            let rank = state.stats.score(&concept.id);
            RankedConcept { concept, rank }
        })
        .collect();

    results.sort_by(|a, b| {
        b.rank
            .partial_cmp(&a.rank)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.concept.id.cmp(&b.concept.id))
    });
    results.truncate(limit);
    Json(results)
}

// ============================================================================
// Vector Resolution
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SemanticSearchRequest {
    /// Query embedding; must match the index dimension.
    pub embedding: Vec<f32>,
    pub cutoff_score: Option<f32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SemanticHit {
    pub concept_id: ConceptId,
    pub score: f32,
    pub concept: Option<Concept>,
}

/// Resolve a client-supplied embedding to similar concepts.
///
/// Embedding generation is the caller's concern; this endpoint consumes
/// raw vectors.
pub async fn semantic_search(
    State(state): State<SharedState>,
    Json(req): Json<SemanticSearchRequest>,
) -> ApiResult<Vec<SemanticHit>> {
    let cutoff = req.cutoff_score.unwrap_or(0.1);
    let results = state
        .resolver
        .resolve(&Embedding::new(req.embedding), cutoff)
        .map_err(error_response)?;

    let mut hits: Vec<SemanticHit> = results
        .into_iter()
        .map(|r| {
            let concept = state.graph.get_concept(&r.concept_id);
            SemanticHit {
                concept_id: r.concept_id,
                score: r.score,
                concept,
            }
        })
        .collect();
    if let Some(limit) = req.limit {
        hits.truncate(limit);
    }
    Ok(Json(hits))
}

// ============================================================================
// Traversal and Retrieval
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TraverseQuery {
    pub depth: Option<usize>,
}

/// The neighborhood of a concept within `depth` hops, either direction.
pub async fn traverse_graph(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<TraverseQuery>,
) -> ApiResult<SubgraphResponse> {
    let id = ConceptId::from(id);
    let depth = params.depth.unwrap_or(2);

    let ego = neighborhood::ego_graph(&state.graph, &id, depth).map_err(error_response)?;
    Ok(Json(SubgraphResponse::from_subgraph(&ego)))
}

#[derive(Debug, Deserialize)]
pub struct RecursiveSearchQuery {
    /// Comma-separated semantic tags.
    pub include_tags: Option<String>,
    /// Comma-separated semantic tags.
    pub stop_tags: Option<String>,
    pub max_depth: Option<usize>,
}

/// Collect traversal paths from one node under a tag policy.
pub async fn recursive_search(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<RecursiveSearchQuery>,
) -> ApiResult<Vec<SearchPath>> {
    let seed = ConceptId::from(id);
    let search = SearchParams {
        include_tags: parse_tag_list(&params.include_tags)?,
        stop_tags: parse_tag_list(&params.stop_tags)?,
        max_depth: params.max_depth.unwrap_or(3),
    };

    let mut traversal = TraversalState::new();
    let paths = collect_paths(&state.graph, &seed, &search, &state.hubs, &mut traversal)
        .map_err(error_response)?;
    Ok(Json(paths))
}

#[derive(Debug, Deserialize)]
pub struct RelatedSubgraphRequest {
    /// One embedding per query term; dimensions must match the index.
    pub term_embeddings: Vec<Vec<f32>>,
    pub cutoff_score: Option<f32>,
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default)]
    pub stop_tags: Vec<String>,
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub seeds_only: bool,
    /// Post-processing: "connected", "weakly_connected",
    /// "strongly_connected", "attracting", or "containing_seeds".
    pub component: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelatedSubgraphResponse {
    pub seeds: Vec<ConceptId>,
    #[serde(flatten)]
    pub subgraph: SubgraphResponse,
}

/// The full retrieval pipeline: resolve each term embedding to seeds,
/// traverse, compose, optionally keep one component.
pub async fn related_subgraph(
    State(state): State<SharedState>,
    Json(req): Json<RelatedSubgraphRequest>,
) -> ApiResult<RelatedSubgraphResponse> {
    let config = RetrievalConfig {
        cutoff_score: req.cutoff_score.unwrap_or(0.1),
        include_tags: parse_tags(&req.include_tags)?,
        stop_tags: parse_tags(&req.stop_tags)?,
        max_depth: req.max_depth.unwrap_or(3),
        seeds_only: req.seeds_only,
    };

    let embeddings: Vec<Embedding> = req
        .term_embeddings
        .into_iter()
        .map(Embedding::new)
        .collect();

    let result = related_subgraphs(
        &state.graph,
        &state.resolver,
        &state.hubs,
        &embeddings,
        &config,
    )
    .map_err(error_response)?;

    let graph = match req.component.as_deref() {
        None => result.graph,
        Some("connected") => components::largest_connected_component(&result.graph),
        Some("weakly_connected") => {
            components::largest_weakly_connected_component(&result.graph)
        }
        Some("strongly_connected") => {
            components::largest_strongly_connected_component(&result.graph)
        }
        Some("attracting") => components::largest_attracting_component(&result.graph),
        Some("containing_seeds") => {
            let targets = result.seeds.iter().cloned().collect();
            components::largest_component_containing_nodes(&result.graph, &targets)
        }
        Some(other) => {
            return Err(bad_request(format!("unsupported component mode: {other:?}")));
        }
    };

    Ok(Json(RelatedSubgraphResponse {
        seeds: result.seeds,
        subgraph: SubgraphResponse::from_subgraph(&graph),
    }))
}

// ============================================================================
// Neighborhood and Centrality
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LocalImportantQuery {
    pub n: Option<usize>,
}

/// Ego-graph members ordered by local degree.
pub async fn local_important_nodes(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<LocalImportantQuery>,
) -> ApiResult<Vec<Concept>> {
    let id = ConceptId::from(id);
    let nodes = neighborhood::local_important_nodes(&state.graph, &id, params.n.unwrap_or(1))
        .map_err(error_response)?;

    Ok(Json(
        nodes
            .into_iter()
            .filter_map(|node| state.graph.get_concept(&node))
            .collect(),
    ))
}

/// Global standing of one concept.
pub async fn node_rank(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let id = ConceptId::from(id);
    require_node(&state, &id)?;

    Ok(Json(serde_json::json!({
        "id": id,
        "pagerank": state.stats.score(&id),
        "is_top": state.stats.is_top(&id),
        "is_hub": state.hubs.contains(&id),
        "degree": state.graph.degree(&id),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ShortestPathQuery {
    pub source: String,
    pub target: String,
}

pub async fn shortest_path(
    State(state): State<SharedState>,
    Query(params): Query<ShortestPathQuery>,
) -> ApiResult<Vec<Concept>> {
    let source = ConceptId::from(params.source);
    let target = ConceptId::from(params.target);

    let path = neighborhood::shortest_path(&state.graph, &source, &target)
        .map_err(error_response)?
        .ok_or_else(|| not_found("No path found between the specified nodes"))?;

    Ok(Json(
        path.into_iter()
            .filter_map(|node| state.graph.get_concept(&node))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CommonNeighborsQuery {
    pub node1: String,
    pub node2: String,
}

pub async fn common_neighbors(
    State(state): State<SharedState>,
    Query(params): Query<CommonNeighborsQuery>,
) -> ApiResult<Vec<Concept>> {
    let a = ConceptId::from(params.node1);
    let b = ConceptId::from(params.node2);

    let common =
        neighborhood::common_neighbors(&state.graph, &a, &b).map_err(error_response)?;
    Ok(Json(
        common
            .into_iter()
            .filter_map(|node| state.graph.get_concept(&node))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DiffusionQuery {
    pub steps: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DiffusionEntry {
    pub concept_id: ConceptId,
    pub mass: f64,
}

/// Spread unit mass from a node across out-edges.
pub async fn diffusion(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<DiffusionQuery>,
) -> ApiResult<Vec<DiffusionEntry>> {
    let id = ConceptId::from(id);
    let spread = neighborhood::diffusion(&state.graph, &id, params.steps.unwrap_or(3))
        .map_err(error_response)?;

    Ok(Json(
        spread
            .into_iter()
            .map(|(concept_id, mass)| DiffusionEntry { concept_id, mass })
            .collect(),
    ))
}

// ============================================================================
// Candidate Ranking
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub candidates: Vec<String>,
    pub ego_radius: Option<usize>,
}

/// Order candidate concepts by combined local/global/semantic importance.
pub async fn rank_candidates(
    State(state): State<SharedState>,
    Json(req): Json<RankRequest>,
) -> ApiResult<Vec<ConceptId>> {
    let candidates: Vec<ConceptId> = req.candidates.into_iter().map(ConceptId::from).collect();
    let options = RankOptions {
        ego_radius: req.ego_radius.unwrap_or(1),
    };

    let ranked = rank_concepts(
        &candidates,
        &state.graph,
        &state.stats,
        &state.resolver,
        &options,
    )
    .map_err(error_response)?;
    Ok(Json(ranked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concept_graph::io::EmbeddingRow;
    use concept_graph::Relationship;

    fn sample_dump() -> GraphDump {
        GraphDump {
            concepts: vec![
                Concept::new("1", "Chest pain")
                    .with_tag(SemanticTag::parse("finding").unwrap()),
                Concept::new("2", "Myocardial infarction")
                    .with_tag(SemanticTag::parse("disorder").unwrap()),
            ],
            relationships: vec![Relationship::new("1", "2", "associated_with")],
            embeddings: vec![EmbeddingRow {
                concept_id: ConceptId::from("1"),
                vector: vec![1.0, 0.0],
            }],
        }
    }

    #[test]
    fn test_state_from_dump() {
        let state = AppState::from_dump(&sample_dump(), 2, 5).unwrap();
        assert_eq!(state.graph.concept_count(), 2);
        assert_eq!(state.resolver.len(), 1);
        assert_eq!(state.hubs.len(), 1);
    }

    #[test]
    fn test_empty_state() {
        let state = AppState::empty(768);
        assert_eq!(state.graph.concept_count(), 0);
        assert!(state.hubs.is_empty());
        assert_eq!(state.resolver.dim(), 768);
    }

    #[test]
    fn test_parse_tag_list() {
        let tags = parse_tag_list(&Some("disorder, finding".to_owned())).unwrap();
        assert_eq!(tags.len(), 2);

        assert!(parse_tag_list(&None).unwrap().is_empty());
        assert!(parse_tag_list(&Some("not-a-tag".to_owned())).is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response(GraphError::NodeNotFound(ConceptId::from("1")));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = error_response(GraphError::UnknownSemanticTag("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(GraphError::Vector(
            vector_index::VectorError::DimensionMismatch { expected: 2, got: 3 },
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_concept_matches_name_and_tag() {
        let concept = Concept::new("1", "Chest pain")
            .with_tag(SemanticTag::parse("finding").unwrap());
        assert!(concept_matches(&concept, "chest"));
        assert!(concept_matches(&concept, "finding"));
        assert!(!concept_matches(&concept, "fracture"));
    }
}
