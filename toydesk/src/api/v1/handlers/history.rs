//! v1 Chat history handlers.

use axum::extract::{Path, Query, State};

use crate::api::v1::dto::{
    ChatTurnResponse, ClearHistoryResponse, HistoryQuery, HistoryResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ResponseMeta};
use crate::api::AppState;

/// `GET /api/v1/history/{userId}`
#[utoipa::path(
    get,
    path = "/api/v1/history/{userId}",
    tag = "history",
    operation_id = "history.list",
    params(
        ("userId" = String, Path, description = "User id from POST /sessions"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "Recent turns, oldest first", body = HistoryResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResponse<HistoryResponse> {
    let turns = match state.chat.history(&user_id, query.limit()).await {
        Ok(turns) => turns,
        Err(e) => return e.into(),
    };

    let total = turns.len() as u64;
    ApiResponse::success_with_meta(
        HistoryResponse {
            user_id,
            turns: turns.into_iter().map(ChatTurnResponse::from).collect(),
        },
        ResponseMeta { total: Some(total) },
    )
}

/// `DELETE /api/v1/history/{userId}`
#[utoipa::path(
    delete,
    path = "/api/v1/history/{userId}",
    tag = "history",
    operation_id = "history.clear",
    params(("userId" = String, Path, description = "User id from POST /sessions")),
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<ClearHistoryResponse> {
    match state.chat.clear_history(&user_id).await {
        Ok(deleted) => ApiResponse::success(ClearHistoryResponse { user_id, deleted }),
        Err(e) => e.into(),
    }
}
