//! API Server - HTTP surface over the medgraph retrieval engine.
//!
//! This crate provides:
//! - REST API for term resolution, traversal, and subgraph retrieval
//! - Query-parameter mapping 1:1 onto the core contracts
//! - Boot-time loading of the graph dump, hub set, and PageRank snapshot

pub mod routes;
pub mod handlers;

pub use handlers::{AppState, SharedState};
pub use routes::{create_router, create_router_with_middleware};
