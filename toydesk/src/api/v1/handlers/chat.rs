//! v1 Chat handler.

use axum::extract::State;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{ChatRequest, ChatResponse};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `POST /api/v1/chat`
///
/// A reply is returned even when the store documents or the history store
/// are unavailable; `contextState` says which documents were used.
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    tag = "chat",
    operation_id = "chat.send",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 429, description = "Model rate limited", body = ApiError),
        (status = 502, description = "Model call failed", body = ApiError),
        (status = 503, description = "No model configured", body = ApiError),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> ApiResponse<ChatResponse> {
    match state.chat.respond(&req.user_id, &req.message).await {
        Ok(reply) => ApiResponse::success(ChatResponse::from(reply)),
        Err(e) => e.into(),
    }
}
