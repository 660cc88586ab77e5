use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::status::{FACTMATCH_STATUS_ERROR, FACTMATCH_STATUS_HEADER};
use crate::service::MatchError;

/// Request failures. `Display` carries detail for logs; clients only see a
/// generic message and the status code.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("match failed: {0}")]
    MatchFailed(#[from] MatchError),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::MatchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "Bad Request",
            GatewayError::MatchFailed(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            FACTMATCH_STATUS_HEADER,
            HeaderValue::from_static(FACTMATCH_STATUS_ERROR),
        );

        let body = Json(ErrorResponse {
            error: self.public_message().to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
