//! HTTP gateway (Axum): the response assembler and probe endpoints.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;
pub mod status;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::fasttext_handler;
pub use payload::{FactCheckRequest, FactCheckResponse, ResponseBody, SentryContext};
pub use state::HandlerState;
pub use status::{
    FACTMATCH_STATUS_ERROR, FACTMATCH_STATUS_HEADER, FACTMATCH_STATUS_HEALTHY,
    FACTMATCH_STATUS_NOT_READY, FACTMATCH_STATUS_READY, MatchStatus,
};

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/health-check", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/fasttext", post(fasttext_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ComponentStatus {
    pub http: String,
    pub corpus: String,
    pub corpus_entries: usize,
    pub generation: u64,
    pub loaded_at: Option<String>,
    pub embedder_mode: String,
}

/// Liveness probe; the body is the JSON string `"Alive"`.
#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        FACTMATCH_STATUS_HEADER,
        HeaderValue::from_static(FACTMATCH_STATUS_HEALTHY),
    );

    (StatusCode::OK, headers, Json("Alive")).into_response()
}

/// Readiness probe: ready once a corpus snapshot is installed.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let cache = state.service.cache();
    let snapshot = cache.snapshot();

    let is_ready = snapshot.is_loaded();
    let status = if is_ready {
        FACTMATCH_STATUS_READY
    } else {
        FACTMATCH_STATUS_NOT_READY
    };

    let components = ComponentStatus {
        http: FACTMATCH_STATUS_READY.to_string(),
        corpus: status.to_string(),
        corpus_entries: snapshot.len(),
        generation: snapshot.generation(),
        loaded_at: snapshot.loaded_at().map(|ts| ts.format()),
        embedder_mode: cache.embedder().mode().to_string(),
    };

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut headers = HeaderMap::new();
    headers.insert(FACTMATCH_STATUS_HEADER, HeaderValue::from_static(status));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status.to_string(),
            components,
        }),
    )
        .into_response()
}
