use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api::state::AppState;

use super::handlers;
use super::middleware::admin_auth_middleware;

/// Chat bodies are a user id and one message.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let history = Router::new().route(
        "/{userId}",
        get(handlers::history::get_history).delete(handlers::history::clear_history),
    );

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/sessions", post(handlers::sessions::create_session))
        .route("/chat", post(handlers::chat::send_message))
        .nest("/history", history)
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let admin_routes = Router::new()
        .route(
            "/admin/context-cache",
            get(handlers::admin::context_cache_status).delete(handlers::admin::clear_context_cache),
        )
        .route(
            "/admin/product-index",
            get(handlers::admin::product_index_stats),
        )
        .route(
            "/admin/product-index:rebuild",
            post(handlers::admin::rebuild_product_index),
        )
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
