//! v1 Session handler.

use nanoid::nanoid;

use crate::api::v1::dto::SessionResponse;
use crate::api::v1::response::ApiResponse;

/// `POST /api/v1/sessions`
///
/// Issues an anonymous user id. Nothing is stored until the first chat
/// message arrives.
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "sessions",
    operation_id = "sessions.create",
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
    )
)]
pub async fn create_session() -> ApiResponse<SessionResponse> {
    let user_id = nanoid!();
    tracing::debug!(user_id = %user_id, "Issued session id");
    ApiResponse::created(SessionResponse { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_ids_are_unique_nanoids() {
        let first = create_session().await;
        let second = create_session().await;

        let first = first.data.expect("data").user_id;
        let second = second.data.expect("data").user_id;
        assert_eq!(first.len(), 21);
        assert_ne!(first, second);
    }
}
