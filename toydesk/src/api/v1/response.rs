//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope with three
//! optional top-level fields:
//!
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "total": 12 },
//!   "error": { "code": "invalid_request", "message": "..." }
//! }
//! ```
//!
//! `data` and `error` are mutually exclusive. User ids issued by
//! `POST /sessions` are 21-character nanoids.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ToydeskError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire. Each variant maps to a
/// fixed HTTP status via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed body, missing field or failed validation. HTTP 400.
    InvalidRequest,
    /// Missing or wrong admin key. HTTP 401.
    Unauthorized,
    /// HTTP 404.
    NotFound,
    /// The language model rejected the call for rate limiting. HTTP 429.
    RateLimited,
    /// Details are logged, never returned. HTTP 500.
    InternalError,
    /// The language model answered with an error. HTTP 502.
    UpstreamError,
    /// No language model is configured or reachable. HTTP 503.
    Unavailable,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::InternalError => write!(f, "internal_error"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Structured error payload within the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to end users.
    pub message: String,
}

/// Extra information attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Canonical v1 API response envelope.
///
/// The HTTP status comes from the error code on failure, or from the
/// constructor used on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// HTTP 200.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// HTTP 201.
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::CREATED,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<ToydeskError> for ApiResponse<T> {
    /// Map a [`ToydeskError`] onto the envelope.
    ///
    /// Storage, IO and other internal failures are logged with
    /// `tracing::error!` and reported with a generic message.
    fn from(err: ToydeskError) -> Self {
        match err {
            ToydeskError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),

            ToydeskError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            ToydeskError::ApiAuth(_) => {
                ApiResponse::error(ErrorCode::Unauthorized, "Authentication required")
            }

            ToydeskError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ToydeskError::UrlParse(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid URL: {e}"))
            }

            ToydeskError::LlmRateLimit { retry_after } => {
                let msg = match retry_after {
                    Some(secs) => format!("Assistant is busy, retry after {secs} seconds"),
                    None => "Assistant is busy, please retry shortly".to_string(),
                };
                ApiResponse::error(ErrorCode::RateLimited, msg)
            }

            ToydeskError::LlmUnavailable(ref reason) => {
                tracing::warn!(reason = %reason, "Chat requested while LLM is unavailable");
                ApiResponse::error(ErrorCode::Unavailable, "Assistant is currently unavailable")
            }

            ToydeskError::Llm(ref msg) => {
                tracing::error!(error = %msg, "LLM call failed");
                ApiResponse::error(
                    ErrorCode::UpstreamError,
                    "Assistant could not answer right now",
                )
            }

            ref internal @ (ToydeskError::Database(_)
            | ToydeskError::Http(_)
            | ToydeskError::Io(_)
            | ToydeskError::Internal(_)
            | ToydeskError::ContextLoad(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
