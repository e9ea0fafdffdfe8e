//! API error types with structured JSON responses.
//!
//! Every failure leaving the HTTP surface is `{"error": {code, message}}`
//! with a status that tells the caller whose fault it was: 4xx for the
//! upload, 502/503 for the model endpoint, 500 for us. Internal details
//! are logged, never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::DraftError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream model failure: {0}")]
    Upstream(String),
    #[error("Model endpoint rate limited")]
    RateLimited { retry_after: Option<u64> },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Upstream(detail) => {
                tracing::error!(detail, "upstream model failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM",
                    "The drafting model could not be reached".to_string(),
                )
            }
            ApiError::RateLimited { retry_after } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "RATE_LIMITED",
                match retry_after {
                    Some(secs) => format!("Model endpoint rate limited. Retry after {secs}s"),
                    None => "Model endpoint rate limited".to_string(),
                },
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited {
            retry_after: Some(secs),
        } = &self
        {
            if let Ok(val) = axum::http::HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::UnsupportedUpload { .. }
            | DraftError::EmptyDocument { .. }
            | DraftError::ExtractionFailed { .. } => ApiError::BadRequest(err.to_string()),
            DraftError::RateLimited { retry_after_secs } => ApiError::RateLimited {
                retry_after: retry_after_secs,
            },
            DraftError::RequestFailed { .. }
            | DraftError::ApiStatus { .. }
            | DraftError::UpstreamUnavailable { .. }
            | DraftError::ApiTimeout { .. }
            | DraftError::EmptyCompletion => ApiError::Upstream(err.to_string()),
            DraftError::MissingApiKey { .. }
            | DraftError::ComposeFailed { .. }
            | DraftError::OutputWriteFailed { .. }
            | DraftError::InvalidConfig(_) => ApiError::Internal(err.to_string()),
        }
    }
}
