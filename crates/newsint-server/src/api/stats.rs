use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DedupStatsData {
    pub total_articles: i64,
    pub unique_articles: i64,
    pub duplicate_articles: i64,
    pub deduplication_rate: f64,
    pub average_similarity_score: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct ArticleCounts {
    pub total: i64,
    pub unique: i64,
    pub duplicates: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct TopEntityItem {
    pub entity: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub frequency: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct EntityCounts {
    pub types: i64,
    pub unique_entities: i64,
    pub top_10: Vec<TopEntityItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct TopStockItem {
    pub symbol: String,
    pub frequency: i64,
    pub avg_confidence: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct StockCounts {
    pub unique_stocks: i64,
    pub top_10: Vec<TopStockItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct CorpusStatsData {
    pub articles: ArticleCounts,
    pub entities: EntityCounts,
    pub stocks: StockCounts,
}

/// Deduplication statistics for the whole corpus.
pub(super) async fn deduplication_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DedupStatsData>>, ApiError> {
    let stats = newsint_db::dedup_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: DedupStatsData {
            total_articles: stats.total_articles,
            unique_articles: stats.unique_articles,
            duplicate_articles: stats.duplicate_articles,
            deduplication_rate: round2(stats.deduplication_rate),
            average_similarity_score: round3(stats.average_similarity),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Corpus-wide statistics: articles, entities, and impacted instruments.
pub(super) async fn corpus_statistics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CorpusStatsData>>, ApiError> {
    let stats = newsint_db::corpus_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CorpusStatsData {
            articles: ArticleCounts {
                total: stats.total_articles,
                unique: stats.unique_articles,
                duplicates: stats.duplicate_articles,
            },
            entities: EntityCounts {
                types: stats.entity_type_count,
                unique_entities: stats.unique_entity_count,
                top_10: stats
                    .top_entities
                    .into_iter()
                    .map(|row| TopEntityItem {
                        entity: row.entity_text,
                        entity_type: row.entity_type,
                        frequency: row.frequency,
                    })
                    .collect(),
            },
            stocks: StockCounts {
                unique_stocks: stats.unique_stock_count,
                top_10: stats
                    .top_stocks
                    .into_iter()
                    .map(|row| TopStockItem {
                        symbol: row.stock_symbol,
                        frequency: row.frequency,
                        avg_confidence: round3(row.avg_confidence),
                    })
                    .collect(),
            },
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers_truncate_to_expected_precision() {
        assert!((round2(33.333_333) - 33.33).abs() < 1e-9);
        assert!((round3(0.123_456) - 0.123).abs() < 1e-9);
    }

    #[test]
    fn top_entity_item_serializes_type_alias() {
        let item = TopEntityItem {
            entity: "RBI".to_string(),
            entity_type: "regulator".to_string(),
            frequency: 4,
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(json.contains("\"type\":\"regulator\""));
    }
}
