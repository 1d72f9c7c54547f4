//! Search endpoint handlers

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use super::state::AppState;
use super::types::{AdaptiveParams, ApiError, CragParams, Query, SearchParams, SelfRagParams};
use crate::domain::Resource;
use crate::infrastructure::services::SearchResponse;

/// Routes mounted under `/search`
pub fn create_search_router() -> Router<AppState> {
    Router::new()
        .route("/{query}", get(search))
        .route("/adaptive_query/{query}", get(adaptive_query))
        .route("/crag/{query}", get(crag))
        .route("/self_rag/{query}", get(self_rag))
}

/// GET /search/{query}
pub async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    let k = params.k.unwrap_or(state.rag_service.defaults().search_k);
    debug!(k, "Similarity search");

    let resources = state
        .rag_service
        .search_resources(&query, k)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(resources))
}

/// GET /search/adaptive_query/{query}
pub async fn adaptive_query(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<AdaptiveParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let options = params.into_options(state.rag_service.defaults().adaptive);
    debug!(
        k = options.k,
        rerank = options.rerank,
        category = %options.category,
        "Adaptive query"
    );

    let response = state
        .rag_service
        .adaptive(&query, options)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(response))
}

/// GET /search/crag/{query}
pub async fn crag(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<CragParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let k = params.k.unwrap_or(state.rag_service.defaults().crag_k);
    debug!(k, "CRAG query");

    let response = state
        .rag_service
        .crag(&query, k)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(response))
}

/// GET /search/self_rag/{query}
pub async fn self_rag(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(params): Query<SelfRagParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let top_k = params
        .top_k
        .unwrap_or(state.rag_service.defaults().self_rag_top_k);
    debug!(top_k, "Self-RAG query");

    let response = state
        .rag_service
        .self_rag(&query, top_k)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(response))
}
