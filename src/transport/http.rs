//! HTTP ingestion: chat platforms push events, replies come back in the
//! response body.

use super::TransportError;
use crate::bot::Bot;
use crate::error::ErrorKind;
use crate::render::RenderInstruction;
use crate::router::Inbound;
use crate::session::ChatId;
use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, instrument, warn};

/// Builds the ingestion router.
///
/// - `POST /chats/{chat_id}/events` takes one JSON [`Inbound`] event and
///   answers with the JSON array of render instructions it produced.
/// - `GET /health` answers `ok`.
pub fn app(bot: Arc<Bot>) -> Router {
    Router::new()
        .route("/chats/{chat_id}/events", post(post_event))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(bot)
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip(bot, inbound))]
async fn post_event(
    State(bot): State<Arc<Bot>>,
    Path(chat_id): Path<ChatId>,
    Json(inbound): Json<Inbound>,
) -> Result<Json<Vec<RenderInstruction>>, (StatusCode, Json<Value>)> {
    match bot.on_inbound(chat_id, inbound).await {
        Ok(instructions) => {
            info!(count = instructions.len(), "Event handled");
            Ok(Json(instructions))
        }
        Err(e) => {
            warn!(error = %e, "Event handled with errors");
            let status = match e.kind {
                ErrorKind::TransportFailure => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(json!({ "kind": e.kind.to_string(), "message": e.message })),
            ))
        }
    }
}

/// Serves the ingestion router until the process stops.
#[instrument(skip(bot))]
pub async fn serve(bot: Arc<Bot>, host: &str, port: u16) -> Result<(), TransportError> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server ready at http://{}:{}/", host, port);
    axum::serve(listener, app(bot)).await?;
    Ok(())
}
