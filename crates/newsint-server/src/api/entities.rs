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
pub(super) struct EntityFrequencyItem {
    pub entity_text: String,
    pub entity_type: String,
    pub frequency: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListEntitiesQuery {
    pub entity_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List extracted entities across the corpus, most mentioned first.
pub(super) async fn list_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListEntitiesQuery>,
) -> Result<Json<ApiResponse<Vec<EntityFrequencyItem>>>, ApiError> {
    let rows = newsint_db::list_entity_frequencies(
        &state.pool,
        query.entity_type.as_deref(),
        normalize_limit(query.limit),
        normalize_offset(query.offset),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| EntityFrequencyItem {
            entity_text: row.entity_text,
            entity_type: row.entity_type,
            frequency: row.frequency,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
