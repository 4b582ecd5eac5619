use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{
    domain::InboundEvent,
    pipeline::{Orchestrator, WebhookReply},
};

#[derive(Clone)]
pub struct ServerState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/slack/events", post(slack_events))
        .with_state(state)
}

/// POST /slack/events — the webhook endpoint. Processing runs in a spawned
/// task so a dropped caller connection never aborts mid-remediation.
async fn slack_events(State(state): State<ServerState>, body: Bytes) -> Response {
    let event: InboundEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            tracing::debug!(target: "server", error = %err, "unparseable event payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let orchestrator = state.orchestrator.clone();
    let handle = tokio::spawn(async move { orchestrator.handle_event(event).await });
    match handle.await {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            tracing::error!(target: "server", error = %err, "event task panicked");
            StatusCode::OK.into_response()
        }
    }
}

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        match self {
            // The challenge must be echoed verbatim as the whole body.
            WebhookReply::Challenge(challenge) => (StatusCode::OK, challenge).into_response(),
            WebhookReply::Ack => StatusCode::OK.into_response(),
            WebhookReply::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// GET / returns a small health JSON for probes.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}
