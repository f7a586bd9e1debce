//! medgraph API Server
//!
//! Serves the concept graph retrieval engine over HTTP.
//!
//! ## Environment Variables
//!
//! - `PORT`: Server port (default: 3000)
//! - `GRAPH_DUMP`: Path to the ingested graph dump (JSON); starts empty if unset
//! - `VECTOR_DIM`: Embedding dimension when the dump carries no embeddings (default: 768)
//! - `PAGERANK_TOP_N`: Size of the globally-important node set (default: 10)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_server::{create_router_with_middleware, AppState};
use concept_graph::GraphDump;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=info,concept_graph=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let dim: usize = std::env::var("VECTOR_DIM")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(768);

    let pagerank_top_n: usize = std::env::var("PAGERANK_TOP_N")
        .ok()
        .and_then(|n| n.parse().ok())
        .unwrap_or(10);

    let dump_path: Option<PathBuf> = std::env::var("GRAPH_DUMP").ok().map(PathBuf::from);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting medgraph API server on {}", addr);

    // Load the graph once; hubs and pagerank are computed here, never per
    // query.
    let state = match dump_path {
        Some(ref path) => {
            tracing::info!("Loading graph dump from {:?}", path);
            match load_state(path, dim, pagerank_top_n) {
                Ok(state) => Arc::new(state),
                Err(e) => {
                    tracing::error!("Failed to load graph dump: {}", e);
                    tracing::warn!("Falling back to an empty graph");
                    Arc::new(AppState::empty(dim))
                }
            }
        }
        None => {
            tracing::info!("No GRAPH_DUMP set; starting with an empty graph");
            Arc::new(AppState::empty(dim))
        }
    };

    let app = create_router_with_middleware(state);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

fn load_state(
    path: &std::path::Path,
    fallback_dim: usize,
    pagerank_top_n: usize,
) -> concept_graph::Result<AppState> {
    let dump = GraphDump::load(path)?;
    let dim = dump.embedding_dim().unwrap_or(fallback_dim);
    AppState::from_dump(&dump, dim, pagerank_top_n)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
