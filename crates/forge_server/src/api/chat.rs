//! Chat streaming over Server-Sent Events.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::header::{HeaderName, CACHE_CONTROL};
use axum::http::HeaderValue;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::StatusResponse;
use crate::error::ApiError;
use crate::state::AppContext;

/// Terminal frame of a successful reply.
pub const DONE_MARKER: &str = "[DONE]";

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/stream", post(stream_chat))
        .route("/reset", post(reset_chat))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// Escape line breaks so a chunk always fits in one `data:` line.
pub fn escape_chunk(chunk: &str) -> String {
    chunk.replace('\r', "\\r").replace('\n', "\\n")
}

/// POST /api/chat/stream
///
/// One `data:` frame per chunk, then `data: [DONE]`. A mid-stream failure
/// ends the stream with an `error` event instead of the marker.
#[instrument(skip(ctx, request), fields(project_id = ?request.project_id))]
async fn stream_chat(
    State(ctx): State<AppContext>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let orchestrator = ctx.orchestrator();
    let mut chunks = orchestrator.send_message(&request.message)?;
    if let Some(project_id) = request.project_id {
        orchestrator.set_project_context(Some(project_id.to_string()))?;
    }

    let events = async_stream::stream! {
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    yield Ok::<Event, Infallible>(Event::default().data(escape_chunk(&text)));
                }
                Err(e) => {
                    warn!(error = %e, "Chat stream failed");
                    yield Ok(Event::default().event("error").data(escape_chunk(&e.to_string())));
                    return;
                }
            }
        }
        yield Ok(Event::default().data(DONE_MARKER));
    };

    let mut response = Sse::new(events).into_response();
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    Ok(response)
}

/// POST /api/chat/reset
async fn reset_chat(State(ctx): State<AppContext>) -> Result<Json<StatusResponse>, ApiError> {
    ctx.orchestrator().reset().await?;
    info!("Chat reset");
    Ok(StatusResponse::new("reset"))
}
