//! API routes definition.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, SharedState};

/// Create the API router with shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Text and metadata search
        .route("/search", get(handlers::search_nodes))
        .route("/ranked_search", get(handlers::ranked_search))
        // Vector resolution
        .route("/semantic_search", post(handlers::semantic_search))
        // Traversal and retrieval
        .route("/traverse/{id}", get(handlers::traverse_graph))
        .route("/recursive_search/{id}", get(handlers::recursive_search))
        .route("/related_subgraph", post(handlers::related_subgraph))
        // Neighborhood and centrality
        .route("/local_important_nodes/{id}", get(handlers::local_important_nodes))
        .route("/node_rank/{id}", get(handlers::node_rank))
        .route("/shortest_path", get(handlers::shortest_path))
        .route("/common_neighbors", get(handlers::common_neighbors))
        .route("/diffusion/{id}", get(handlers::diffusion))
        // Candidate ranking
        .route("/rank", post(handlers::rank_candidates))
        .with_state(state)
}

/// Create router with CORS and logging middleware.
pub fn create_router_with_middleware(state: SharedState) -> Router {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
