//! # V1 Admin Key Middleware
//!
//! Guards the `/admin` routes with Bearer token authentication against
//! `TOYDESK_ADMIN_KEYS`. Chat, history and session routes stay public;
//! customers are anonymous.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Axum middleware enforcing `Authorization: Bearer <key>` for admin routes.
///
/// - No keys configured: every admin request gets 401. The server still
///   starts; the admin surface is simply locked.
/// - Missing or malformed header: 401.
/// - Unknown key: 401.
///
/// Errors use the v1 envelope so clients parse one error shape.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.admin_keys;
    if keys.is_empty() {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "Admin keys not configured. Set TOYDESK_ADMIN_KEYS to enable access.",
        )
        .into_response();
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => {
                return ApiResponse::<()>::error(
                    ErrorCode::Unauthorized,
                    "Invalid authorization header format. Expected: Bearer <token>",
                )
                .into_response();
            }
        },
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    if keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request with unknown key");
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid admin key").into_response()
    }
}
