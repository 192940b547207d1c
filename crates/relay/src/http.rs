use std::net::Ipv4Addr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use peelnet_core::{MessageBody, ResultResponse};

use crate::node::{RelayError, RelayNode};

impl RelayError {
    /// Decryption and framing failures are indistinguishable to callers
    /// beyond a generic rejection; downstream failures surface as 502.
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Peel(_) | RelayError::Malformed(_) => StatusCode::BAD_REQUEST,
            RelayError::Forward { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn router(node: Arc<RelayNode>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(message))
        .route("/getLastReceivedEncryptedMessage", get(last_encrypted))
        .route("/getLastReceivedDecryptedMessage", get(last_decrypted))
        .route("/getLastMessageDestination", get(last_destination))
        .route("/getPrivateKey", get(private_key))
        .with_state(node)
}

/// Bind this relay on its derived port and serve until shutdown.
pub async fn serve(node: Arc<RelayNode>) -> Result<(), RelayError> {
    let port = u16::try_from(node.port()).map_err(|_| {
        RelayError::Server(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "relay port out of range",
        ))
    })?;
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
    tracing::info!(node_id = node.node_id(), port, "onion router listening");
    axum::serve(listener, router(node)).await?;
    Ok(())
}

async fn status() -> &'static str {
    "live"
}

async fn message(State(node): State<Arc<RelayNode>>, Json(body): Json<MessageBody>) -> Response {
    match node.ingress(&body.message).await {
        Ok(()) => "success".into_response(),
        Err(e) => {
            tracing::warn!(node_id = node.node_id(), error = %e, "ingress rejected");
            (e.status(), e.to_string()).into_response()
        }
    }
}

async fn last_encrypted(State(node): State<Arc<RelayNode>>) -> Json<ResultResponse<Option<String>>> {
    Json(ResultResponse::new(node.last().await.encrypted_in))
}

async fn last_decrypted(State(node): State<Arc<RelayNode>>) -> Json<ResultResponse<Option<String>>> {
    Json(ResultResponse::new(node.last().await.decrypted_out))
}

async fn last_destination(State(node): State<Arc<RelayNode>>) -> Json<ResultResponse<Option<u32>>> {
    Json(ResultResponse::new(node.last().await.forward_target))
}

// Diagnostic convenience for the simulation; deliberately not a security
// boundary.
async fn private_key(State(node): State<Arc<RelayNode>>) -> Json<ResultResponse<String>> {
    Json(ResultResponse::new(node.private_key_b64()))
}
