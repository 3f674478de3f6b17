//! Session DTOs for the v1 API.

use serde::Serialize;

/// Response for `POST /v1/sessions`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Anonymous id the client stores and sends with every chat message.
    pub user_id: String,
}
