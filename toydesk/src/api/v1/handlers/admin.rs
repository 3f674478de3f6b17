//! v1 Admin handlers.

use axum::extract::State;

use crate::api::v1::dto::{
    ClearCacheResponse, ContextCacheResponse, ProductIndexResponse, RebuildIndexResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;

/// `GET /api/v1/admin/context-cache`
#[utoipa::path(
    get,
    path = "/api/v1/admin/context-cache",
    tag = "admin",
    responses(
        (status = 200, description = "Context cache status", body = ContextCacheResponse),
        (status = 401, description = "Missing or invalid admin key", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn context_cache_status(
    State(state): State<AppState>,
) -> ApiResponse<ContextCacheResponse> {
    ApiResponse::success(state.context.status().into())
}

/// `DELETE /api/v1/admin/context-cache`
#[utoipa::path(
    delete,
    path = "/api/v1/admin/context-cache",
    tag = "admin",
    responses(
        (status = 200, description = "Context cache cleared", body = ClearCacheResponse),
        (status = 401, description = "Missing or invalid admin key", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_context_cache(State(state): State<AppState>) -> ApiResponse<ClearCacheResponse> {
    state.context.clear();
    ApiResponse::success(ClearCacheResponse {
        cleared: true,
        cache: state.context.status().into(),
    })
}

/// `GET /api/v1/admin/product-index`
#[utoipa::path(
    get,
    path = "/api/v1/admin/product-index",
    tag = "admin",
    responses(
        (status = 200, description = "Product index statistics", body = ProductIndexResponse),
        (status = 401, description = "Missing or invalid admin key", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn product_index_stats(
    State(state): State<AppState>,
) -> ApiResponse<ProductIndexResponse> {
    ApiResponse::success(state.matcher.index_stats().into())
}

/// `POST /api/v1/admin/product-index:rebuild`
///
/// Loads the catalog through the context cache and re-parses it right away.
/// When no catalog is available the current index is left as it is.
#[utoipa::path(
    post,
    path = "/api/v1/admin/product-index:rebuild",
    tag = "admin",
    responses(
        (status = 200, description = "Index rebuilt", body = RebuildIndexResponse),
        (status = 401, description = "Missing or invalid admin key", body = ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rebuild_product_index(
    State(state): State<AppState>,
) -> ApiResponse<RebuildIndexResponse> {
    let lookup = state.chat.lookup_context().await;
    let index = match lookup.documents() {
        Some(docs) => state.matcher.rebuild_index(&docs.product),
        None => {
            tracing::warn!("Product index rebuild skipped, no catalog available");
            state.matcher.index_stats()
        }
    };

    ApiResponse::success(RebuildIndexResponse {
        context_state: lookup.state().into(),
        index: index.into(),
    })
}
