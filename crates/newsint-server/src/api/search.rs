use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_TOP_K: usize = 10;
const MAX_TOP_K: usize = 100;

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponseItem {
    pub id: i64,
    pub title: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResults {
    pub query: String,
    pub results_count: usize,
    pub results: Vec<SearchResponseItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QueryBody {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub(super) struct QueryResult {
    pub query: String,
    pub response: String,
    pub context_articles_used: usize,
    pub degraded: bool,
}

/// Keyword-free search over the canonical corpus.
pub(super) async fn semantic_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let top_k = body.top_k.unwrap_or(DEFAULT_TOP_K).clamp(1, MAX_TOP_K);

    let hits = state
        .enricher
        .search(&state.pool, &body.query, top_k)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    let results: Vec<SearchResponseItem> = hits
        .into_iter()
        .map(|hit| SearchResponseItem {
            id: hit.id,
            title: hit.title,
            score: hit.score,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: SearchResults {
            query: body.query,
            results_count: results.len(),
            results,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Context-grounded question answering over recent canonical articles.
pub(super) async fn contextual_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<QueryBody>,
) -> Result<Json<ApiResponse<QueryResult>>, ApiError> {
    let answer = state
        .enricher
        .answer(&state.pool, &body.query)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: QueryResult {
            query: body.query,
            response: answer.response,
            context_articles_used: answer.context_count,
            degraded: answer.degraded,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
