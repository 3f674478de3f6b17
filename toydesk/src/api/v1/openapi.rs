use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toydesk API",
        version = "1.0.0",
        description = "Customer-support chat for an online toy store.",
    ),
    paths(
        handlers::health::health_check,
        handlers::sessions::create_session,
        handlers::chat::send_message,
        handlers::history::get_history,
        handlers::history::clear_history,
        handlers::admin::context_cache_status,
        handlers::admin::clear_context_cache,
        handlers::admin::product_index_stats,
        handlers::admin::rebuild_product_index,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Common
        dto::V1ContextState,
        dto::V1CacheState,
        dto::ProductResponse,
        dto::ContextCacheResponse,
        dto::ProductIndexResponse,
        // Chat
        dto::ChatRequest,
        dto::ChatResponse,
        dto::SessionResponse,
        // History
        dto::V1ChatRole,
        dto::ChatTurnResponse,
        dto::HistoryResponse,
        dto::ClearHistoryResponse,
        // Admin
        dto::ClearCacheResponse,
        dto::RebuildIndexResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "sessions", description = "Anonymous session ids"),
        (name = "chat", description = "Support chat"),
        (name = "history", description = "Conversation history"),
        (name = "admin", description = "Cache and index operations (admin key required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
