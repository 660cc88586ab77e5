use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Span, field, info, instrument};

use super::error::GatewayError;
use super::payload::{FactCheckRequest, FactCheckResponse};
use super::state::HandlerState;
use super::status::{FACTMATCH_STATUS_HEADER, MatchStatus};

/// `POST /fasttext`: match one message against the fact-check corpus.
#[instrument(
    skip(state, payload),
    fields(
        query_id = field::Empty,
        query_type = field::Empty,
        trace_id = field::Empty,
        span_id = field::Empty
    )
)]
pub async fn fasttext_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = payload
        .map_err(|e| GatewayError::InvalidRequest(format!("unreadable body: {}", e.body_text())))?;
    let request: FactCheckRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid request schema: {}", e)))?;
    record_request_fields(&request);

    if request.query_body.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(format!(
            "empty QueryBody for query {}",
            request.query_id
        )));
    }

    let result = state.service.match_text(&request.query_body).await?;

    let status = if result.is_match() {
        MatchStatus::Match
    } else {
        MatchStatus::NoMatch
    };
    info!(
        query_id = %request.query_id,
        status = %status,
        similarity = ?result.similarity(),
        tier = ?result.tier().map(|t| t.as_str()),
        "Match response"
    );

    Ok(make_response(FactCheckResponse::assemble(request.query_id, &result), status))
}

fn record_request_fields(request: &FactCheckRequest) {
    let span = Span::current();
    span.record("query_id", field::display(&request.query_id));
    if let Some(query_type) = &request.query_type {
        span.record("query_type", field::display(query_type));
    }
    if let Some(sentry) = &request.sentry {
        if let Some(trace_id) = &sentry.trace_id {
            span.record("trace_id", field::display(trace_id));
        }
        if let Some(span_id) = &sentry.span_id {
            span.record("span_id", field::display(span_id));
        }
    }
}

pub(crate) fn make_response(response: FactCheckResponse, status: MatchStatus) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        FACTMATCH_STATUS_HEADER,
        HeaderValue::from_static(status.as_header_value()),
    );
    (StatusCode::OK, headers, Json(response)).into_response()
}
