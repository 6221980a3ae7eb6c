use crate::state::AppState;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Query, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use http::{header, StatusCode};
use genai_chat::{
    errors::{AdapterError, AuthorizationError},
    models::{
        content::Conversation,
        element::UiElement,
        inbound::{HistoryEntry, InboundMessage, WireHistoryEntry, WireMessage},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    collections::HashMap,
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;

/// Inline images arrive base64 encoded in the request body
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    history: Vec<WireHistoryEntry>,
}

/// A request after boundary conversion
struct Turn {
    history: Vec<HistoryEntry>,
    current: Option<InboundMessage>,
}

impl TryFrom<ChatRequest> for Turn {
    type Error = AdapterError;

    fn try_from(request: ChatRequest) -> Result<Self, Self::Error> {
        let history = request
            .history
            .into_iter()
            .map(HistoryEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let current = request.message.map(InboundMessage::try_from).transpose()?;
        Ok(Turn { history, current })
    }
}

#[derive(Debug)]
enum ReplyError {
    Unauthorized(AuthorizationError),
    BadRequest(String),
    Model(anyhow::Error),
}

impl IntoResponse for ReplyError {
    fn into_response(self) -> Response {
        match self {
            ReplyError::Unauthorized(err) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"title": err.title(), "body": err.body()})),
            )
                .into_response(),
            ReplyError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }
            ReplyError::Model(err) => {
                tracing::error!("Model call failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": err.to_string()})),
                )
                    .into_response()
            }
        }
    }
}

/// Guard the request, convert it once at the boundary and build the conversation
///
/// Everything the client can get wrong fails here, before any response body is started.
fn admit(
    state: &AppState,
    query: &HashMap<String, String>,
    request: ChatRequest,
) -> Result<Conversation, ReplyError> {
    state.guard.check(query).map_err(ReplyError::Unauthorized)?;
    let turn = Turn::try_from(request).map_err(|e| ReplyError::BadRequest(e.to_string()))?;
    state
        .chat
        .prepare(&turn.history, turn.current.as_ref())
        .map_err(|e| ReplyError::BadRequest(e.to_string()))
}

// Custom SSE response type streaming element snapshots to the browser
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

// Protocol-specific message formatting
struct ProtocolFormatter;

impl ProtocolFormatter {
    fn format_elements(elements: &[UiElement]) -> Result<String, serde_json::Error> {
        Ok(format!("data: {}\n\n", serde_json::to_string(elements)?))
    }

    fn format_error(message: &str) -> String {
        // json keeps multi-line messages on a single data line
        format!("event: error\ndata: {}\n\n", json!({"error": message}))
    }

    fn format_done() -> String {
        "event: done\ndata: {}\n\n".to_string()
    }
}

async fn handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(request): Json<ChatRequest>,
) -> Result<SseResponse, ReplyError> {
    let conversation = admit(&state, &query, request)?;

    // Create channel for streaming
    let (tx, rx) = mpsc::channel(100);
    let stream = ReceiverStream::new(rx);

    // Spawn task to handle streaming
    tokio::spawn(async move {
        let mut stream = match state.chat.respond(&conversation).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Failed to start reply stream: {:#}", e);
                let _ = tx.send(ProtocolFormatter::format_error(&e.to_string())).await;
                let _ = tx.send(ProtocolFormatter::format_done()).await;
                return;
            }
        };

        loop {
            match timeout(Duration::from_millis(500), stream.next()).await {
                Ok(Some(Ok(elements))) => {
                    let event = match ProtocolFormatter::format_elements(&elements) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::error!("Error encoding elements: {}", e);
                            let _ = tx.send(ProtocolFormatter::format_error(&e.to_string())).await;
                            break;
                        }
                    };
                    if let Err(e) = tx.send(event).await {
                        tracing::error!("Error sending elements through channel: {}", e);
                        break;
                    }
                }
                Ok(Some(Err(e))) => {
                    tracing::error!("Error processing reply: {:#}", e);
                    let _ = tx.send(ProtocolFormatter::format_error(&e.to_string())).await;
                    break;
                }
                Ok(None) => {
                    break;
                }
                Err(_) => {
                    // Heartbeat, used to detect disconnected clients and drop the model stream
                    if tx.is_closed() {
                        tracing::debug!("Client disconnected, abandoning reply");
                        break;
                    }
                    continue;
                }
            }
        }

        let _ = tx.send(ProtocolFormatter::format_done()).await;
    });

    Ok(SseResponse::new(stream))
}

#[derive(Debug, Serialize)]
struct AskResponse {
    elements: Vec<UiElement>,
}

// simple non-streaming reply, returning the final snapshot
async fn ask_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AskResponse>, ReplyError> {
    let conversation = admit(&state, &query, request)?;

    let mut stream = state
        .chat
        .respond(&conversation)
        .await
        .map_err(ReplyError::Model)?;

    let mut elements = Vec::new();
    while let Some(snapshot) = stream.next().await {
        elements = snapshot.map_err(ReplyError::Model)?;
    }

    Ok(Json(AskResponse { elements }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reply", post(handler))
        .route("/ask", post(ask_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
