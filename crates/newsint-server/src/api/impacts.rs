use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_offset, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct StockImpactSummaryItem {
    pub stock_symbol: String,
    pub impact_type: String,
    pub average_confidence: f64,
    pub frequency: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListImpactsQuery {
    pub stock_symbol: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List aggregated stock impacts across the corpus, most frequent first.
pub(super) async fn list_stock_impacts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListImpactsQuery>,
) -> Result<Json<ApiResponse<Vec<StockImpactSummaryItem>>>, ApiError> {
    let rows = newsint_db::list_impact_summaries(
        &state.pool,
        query.stock_symbol.as_deref(),
        normalize_limit(query.limit),
        normalize_offset(query.offset),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| StockImpactSummaryItem {
            stock_symbol: row.stock_symbol,
            impact_type: row.impact_type,
            average_confidence: round3(row.avg_confidence),
            frequency: row.frequency,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
