use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use persona::Completer;
use std::sync::Arc;
use tracing::{debug, error, info};

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub completer: Arc<dyn Completer>,
}

pub async fn index() -> Html<&'static str> {
    info!("index requested");
    Html("Completion gateway is running. POST a prompt as plain text to /api/generate")
}

pub async fn health() -> &'static str {
    "ok"
}

/// Complete the raw prompt in the request body and answer with raw text.
pub async fn generate(State(state): State<AppState>, prompt: String) -> Response {
    if prompt.trim().is_empty() {
        debug!("rejecting empty prompt");
        return (StatusCode::BAD_REQUEST, "empty prompt").into_response();
    }
    match state.completer.complete(&prompt).await {
        Ok(text) => text.trim().to_string().into_response(),
        Err(e) => {
            error!(%e, "completion failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
    }
}

/// Build the application router with the provided state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .with_state(state)
}
