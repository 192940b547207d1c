use std::net::Ipv4Addr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use peelnet_core::{MessageBody, NodeId, ResultResponse, SendMessageBody};

use crate::user::{EndpointError, UserNode};

impl EndpointError {
    fn status(&self) -> StatusCode {
        match self {
            EndpointError::Forward { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn router(user: Arc<UserNode>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/message", post(message))
        .route("/sendMessage", post(send_message))
        .route("/getLastReceivedMessage", get(last_received))
        .route("/getLastSentMessage", get(last_sent))
        .route("/getLastCircuit", get(last_circuit))
        .with_state(user)
}

/// Bind this endpoint on its derived port and serve until shutdown.
pub async fn serve(user: Arc<UserNode>) -> Result<(), EndpointError> {
    let port = u16::try_from(user.port()).map_err(|_| {
        EndpointError::Server(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "user port out of range",
        ))
    })?;
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await?;
    tracing::info!(user_id = user.user_id(), port, "user endpoint listening");
    axum::serve(listener, router(user)).await?;
    Ok(())
}

async fn status() -> &'static str {
    "live"
}

async fn message(State(user): State<Arc<UserNode>>, Json(body): Json<MessageBody>) -> &'static str {
    user.receive(&body.message).await;
    "success"
}

async fn send_message(
    State(user): State<Arc<UserNode>>,
    Json(body): Json<SendMessageBody>,
) -> Response {
    match user.send_message(&body.message, body.destination_user_id).await {
        Ok(()) => "success".into_response(),
        Err(e) => {
            tracing::warn!(user_id = user.user_id(), error = %e, "send failed");
            (e.status(), e.to_string()).into_response()
        }
    }
}

async fn last_received(State(user): State<Arc<UserNode>>) -> Json<ResultResponse<Option<String>>> {
    Json(ResultResponse::new(user.last().await.received))
}

async fn last_sent(State(user): State<Arc<UserNode>>) -> Json<ResultResponse<Option<String>>> {
    Json(ResultResponse::new(user.last().await.sent))
}

async fn last_circuit(State(user): State<Arc<UserNode>>) -> Json<ResultResponse<Vec<NodeId>>> {
    Json(ResultResponse::new(user.last().await.circuit))
}
