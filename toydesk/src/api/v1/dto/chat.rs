//! Chat request/response DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use super::common::{ProductResponse, V1ContextState};
use crate::services::ChatReply;

/// Request body for `POST /v1/chat`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Id from `POST /v1/sessions`, kept by the client.
    pub user_id: String,
    pub message: String,
}

/// Response for `POST /v1/chat`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub context_state: V1ContextState,
    /// Products offered to the model for this message, best first.
    pub products: Vec<ProductResponse>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            reply: reply.reply,
            context_state: reply.context.into(),
            products: reply.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextState;

    #[test]
    fn chat_request_reads_camel_case() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"userId":"u1","message":"hi"}"#).expect("deserialize");
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.message, "hi");
    }

    #[test]
    fn chat_response_serializes_camel_case() {
        let resp = ChatResponse::from(ChatReply {
            reply: "Hello!".to_string(),
            context: ContextState::Stale,
            products: Vec::new(),
        });
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["contextState"], "stale");
        assert_eq!(json["products"], serde_json::json!([]));
    }
}
