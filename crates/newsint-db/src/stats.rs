//! Corpus-wide statistics queries backing the analytics endpoints.

use sqlx::SqlitePool;

use crate::DbError;

const TOP_N: i64 = 10;

/// A high-frequency entity across the corpus.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopEntityRow {
    pub entity_text: String,
    pub entity_type: String,
    pub frequency: i64,
}

/// A frequently impacted instrument across the corpus.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopStockRow {
    pub stock_symbol: String,
    pub frequency: i64,
    pub avg_confidence: f64,
}

/// Aggregate statistics for the whole enriched corpus.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    pub total_articles: i64,
    pub unique_articles: i64,
    pub duplicate_articles: i64,
    pub entity_type_count: i64,
    pub unique_entity_count: i64,
    pub unique_stock_count: i64,
    pub top_entities: Vec<TopEntityRow>,
    pub top_stocks: Vec<TopStockRow>,
}

/// Compute corpus statistics: article counts, entity and instrument
/// cardinalities, and the top-10 entities and symbols by mention count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any of the queries fail.
pub async fn corpus_stats(pool: &SqlitePool) -> Result<CorpusStats, DbError> {
    let total_articles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;

    let unique_articles: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE is_duplicate = 0")
            .fetch_one(pool)
            .await?;

    let entity_type_count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT entity_type) FROM entities")
            .fetch_one(pool)
            .await?;

    let unique_entity_count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT entity_text) FROM entities")
            .fetch_one(pool)
            .await?;

    let unique_stock_count: i64 =
        sqlx::query_scalar("SELECT COUNT(DISTINCT stock_symbol) FROM stock_impacts")
            .fetch_one(pool)
            .await?;

    let top_entities = sqlx::query_as::<_, TopEntityRow>(
        "SELECT entity_text, entity_type, COUNT(*) AS frequency \
         FROM entities \
         GROUP BY entity_text, entity_type \
         ORDER BY frequency DESC, entity_text ASC \
         LIMIT ?",
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    let top_stocks = sqlx::query_as::<_, TopStockRow>(
        "SELECT stock_symbol, COUNT(*) AS frequency, AVG(confidence) AS avg_confidence \
         FROM stock_impacts \
         GROUP BY stock_symbol \
         ORDER BY frequency DESC, stock_symbol ASC \
         LIMIT ?",
    )
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    Ok(CorpusStats {
        total_articles,
        unique_articles,
        duplicate_articles: total_articles - unique_articles,
        entity_type_count,
        unique_entity_count,
        unique_stock_count,
        top_entities,
        top_stocks,
    })
}
