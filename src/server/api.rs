use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{ Body, Bytes },
    extract::{ DefaultBodyLimit, Multipart, State },
    extract::multipart::MultipartRejection,
    http::{ header, HeaderName, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use futures::StreamExt;
use log::{ error, info, warn };
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::timeout::TimeoutLayer;

use crate::extract;
use crate::llm::GeminiClient;
use crate::llm::gemini::TokenStream;
use crate::models::chat::ChatRequest;

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
    /// Duration bound on a request, including the streamed chat body.
    pub request_timeout: Duration,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Serialize)]
struct ExtractTextResponse {
    text: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/extract-text", post(extract_text_handler))
        .layer(cors)
        // Caps time to the response head; the chat body stream enforces the
        // same bound itself in forward_tokens.
        .layer(TimeoutLayer::new(state.request_timeout))
        // Leave headroom for multipart framing around a maximum-size file.
        .layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024))
        .with_state(state)
}

fn error_response(status: StatusCode, error: impl Into<String>, details: Option<String>) -> Response {
    (status, Json(ErrorBody { error: error.into(), details })).into_response()
}

/// Frame model tokens for the caller until the stream ends, an error
/// arrives, or the deadline passes. Dropping the sender closes the
/// response body, so hitting the deadline forcibly ends the request.
async fn forward_tokens(
    mut tokens: TokenStream,
    tx: mpsc::Sender<Result<String, Infallible>>,
    deadline: Instant,
) {
    loop {
        let item = match tokio::time::timeout_at(deadline, tokens.next()).await {
            Ok(item) => item,
            Err(_) => {
                warn!("chat stream hit the request duration limit");
                let frame = format!("3:{}\n", serde_json::json!("request duration limit reached"));
                let _ = tx.send(Ok(frame)).await;
                return;
            }
        };

        match item {
            Some(Ok(tok)) => {
                let frame = format!("0:{}\n", serde_json::json!(tok));
                if tx.send(Ok(frame)).await.is_err() {
                    return;
                }
            }
            Some(Err(e)) => {
                error!("model stream error: {}", e);
                let frame = format!("3:{}\n", serde_json::json!(e.to_string()));
                let _ = tx.send(Ok(frame)).await;
                return;
            }
            None => break,
        }
    }

    let _ = tx.send(Ok("d:{\"finishReason\":\"stop\"}\n".to_string())).await;
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // Parsed by hand so malformed bodies surface as 500 {error} like every
    // other chat failure, rather than the extractor's default rejection.
    let req: ChatRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            error!("chat request parse error: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None);
        }
    };

    let messages = req.into_messages();
    info!("chat: forwarding {} turns to {}", messages.len(), state.gemini.model());

    let tokens = match state.gemini.stream_generate(&messages).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("chat request failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), None);
        }
    };

    let deadline = Instant::now() + state.request_timeout;
    let (tx, rx) = mpsc::channel::<Result<String, Infallible>>(32);
    tokio::spawn(forward_tokens(tokens, tx, deadline));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (HeaderName::from_static("x-vercel-ai-data-stream"), "v1"),
        ],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

async fn extract_text_handler(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid content type", None);
        }
    };

    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        file = Some((name, content_type, bytes));
                        break;
                    }
                    Err(e) => {
                        return error_response(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read file: {}", e),
                            None,
                        );
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Multipart error: {}", e),
                    None,
                );
            }
        }
    }

    let Some((name, content_type, bytes)) = file else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded", None);
    };

    match extract::extract_text(&bytes, &content_type) {
        Ok(text) => {
            info!("extracted '{}' ({}): {} chars", name, content_type, text.len());
            (StatusCode::OK, Json(ExtractTextResponse { text })).into_response()
        }
        Err(e) => {
            error!("failed to process '{}': {}", name, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process file",
                Some(e.to_string()),
            )
        }
    }
}
