use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use newsint_intel::{IngestOutcome, NewsArticle};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_pipeline_error, normalize_limit, normalize_offset, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct IngestArticleBody {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(super) struct ArticleSummaryItem {
    pub id: i64,
    pub title: String,
    pub source: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct EntityItem {
    pub entity_text: String,
    pub entity_type: String,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct StockImpactItem {
    pub stock_symbol: String,
    pub impact_type: String,
    pub confidence: f64,
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ArticleDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub entities: Vec<EntityItem>,
    pub stock_impacts: Vec<StockImpactItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListArticlesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub unique_only: bool,
}

/// Run the full ingestion pipeline for one posted article.
pub(super) async fn ingest_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<IngestArticleBody>,
) -> Result<Json<ApiResponse<IngestOutcome>>, ApiError> {
    let article = NewsArticle {
        title: body.title,
        content: body.content,
        source: body.source,
        url: body.url,
        published_date: body.published_date,
    };

    let outcome = state
        .enricher
        .ingest(&state.pool, article)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: outcome,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Fetch one article with its entity mentions and stock impacts.
pub(super) async fn get_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(article_id): Path<i64>,
) -> Result<Json<ApiResponse<ArticleDetail>>, ApiError> {
    let article = newsint_db::get_article(&state.pool, article_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "article not found"))?;

    let entities = newsint_db::list_entities_for_article(&state.pool, article_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let impacts = newsint_db::list_impacts_for_article(&state.pool, article_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = ArticleDetail {
        id: article.id,
        title: article.title,
        content: article.content,
        source: article.source,
        url: article.url,
        published_date: article.published_date,
        is_duplicate: article.is_duplicate,
        canonical_id: article.canonical_id,
        created_at: article.created_at,
        entities: entities
            .into_iter()
            .map(|row| EntityItem {
                entity_text: row.entity_text,
                entity_type: row.entity_type,
                confidence: row.confidence,
            })
            .collect(),
        stock_impacts: impacts
            .into_iter()
            .map(|row| StockImpactItem {
                stock_symbol: row.stock_symbol,
                impact_type: row.impact_type,
                confidence: row.confidence,
                sentiment: row.sentiment,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// List article summaries, newest first.
pub(super) async fn list_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleSummaryItem>>>, ApiError> {
    let rows = newsint_db::list_articles(
        &state.pool,
        query.unique_only,
        normalize_limit(query.limit),
        normalize_offset(query.offset),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| ArticleSummaryItem {
            id: row.id,
            title: row.title,
            source: row.source,
            published_date: row.published_date,
            is_duplicate: row.is_duplicate,
            canonical_id: row.canonical_id,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
