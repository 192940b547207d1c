use std::net::Ipv4Addr;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use peelnet_core::{NetworkConfig, NodeInfo, RegistryResponse};

use crate::NodeTable;

pub fn router(table: NodeTable) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/registerNode", post(register_node))
        .route("/getNodeRegistry", get(get_node_registry))
        .with_state(table)
}

/// Bind the registry on its configured port and serve until shutdown.
pub async fn serve(table: NodeTable, cfg: NetworkConfig) -> std::io::Result<()> {
    let listener =
        tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, cfg.registry_port)).await?;
    tracing::info!(port = cfg.registry_port, "registry listening");
    axum::serve(listener, router(table)).await
}

async fn status() -> &'static str {
    "live"
}

// Malformed bodies are rejected by the Json extractor before any state
// is touched.
async fn register_node(
    State(table): State<NodeTable>,
    Json(node): Json<NodeInfo>,
) -> &'static str {
    let node_id = node.node_id;
    if table.register(node).await {
        tracing::info!(node_id, "node registered");
    } else {
        tracing::debug!(node_id, "node already registered, ignoring");
    }
    "success"
}

async fn get_node_registry(State(table): State<NodeTable>) -> Json<RegistryResponse> {
    Json(RegistryResponse {
        nodes: table.snapshot().await,
    })
}
