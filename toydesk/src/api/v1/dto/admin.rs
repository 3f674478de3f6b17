//! Admin DTOs for the v1 API.

use serde::Serialize;

use super::common::{ContextCacheResponse, ProductIndexResponse, V1ContextState};

/// Response for `DELETE /v1/admin/context-cache`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    pub cleared: bool,
    pub cache: ContextCacheResponse,
}

/// Response for `POST /v1/admin/product-index:rebuild`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildIndexResponse {
    /// Freshness of the catalog document the index was rebuilt from.
    pub context_state: V1ContextState,
    pub index: ProductIndexResponse,
}
