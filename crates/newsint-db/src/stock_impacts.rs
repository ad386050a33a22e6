//! Database operations for the `stock_impacts` table.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `stock_impacts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockImpactRow {
    pub id: i64,
    pub article_id: i64,
    pub stock_symbol: String,
    pub impact_type: String,
    pub confidence: f64,
    pub sentiment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An aggregated (symbol, impact type) pair with mean confidence and count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockImpactSummaryRow {
    pub stock_symbol: String,
    pub impact_type: String,
    pub avg_confidence: f64,
    pub frequency: i64,
}

/// Fields for a new stock impact insert.
#[derive(Debug)]
pub struct NewStockImpact<'a> {
    pub article_id: i64,
    pub stock_symbol: &'a str,
    pub impact_type: &'a str,
    pub confidence: f64,
    pub sentiment: Option<&'a str>,
}

/// Insert a stock impact mapping and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_stock_impact(
    pool: &SqlitePool,
    impact: &NewStockImpact<'_>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_impacts (article_id, stock_symbol, impact_type, confidence, sentiment) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id",
    )
    .bind(impact.article_id)
    .bind(impact.stock_symbol)
    .bind(impact.impact_type)
    .bind(impact.confidence)
    .bind(impact.sentiment)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List all stock impacts for one article, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_impacts_for_article(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<StockImpactRow>, DbError> {
    let rows = sqlx::query_as::<_, StockImpactRow>(
        "SELECT id, article_id, stock_symbol, impact_type, confidence, sentiment, created_at \
         FROM stock_impacts WHERE article_id = ? \
         ORDER BY id ASC",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List aggregated stock impacts across the corpus, most frequent first,
/// optionally filtered by instrument symbol.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_impact_summaries(
    pool: &SqlitePool,
    stock_symbol: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<StockImpactSummaryRow>, DbError> {
    let rows = match stock_symbol {
        Some(symbol) => {
            sqlx::query_as::<_, StockImpactSummaryRow>(
                "SELECT stock_symbol, impact_type, AVG(confidence) AS avg_confidence, \
                        COUNT(*) AS frequency \
                 FROM stock_impacts WHERE stock_symbol = ? \
                 GROUP BY stock_symbol, impact_type \
                 ORDER BY frequency DESC, stock_symbol ASC \
                 LIMIT ? OFFSET ?",
            )
            .bind(symbol)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, StockImpactSummaryRow>(
                "SELECT stock_symbol, impact_type, AVG(confidence) AS avg_confidence, \
                        COUNT(*) AS frequency \
                 FROM stock_impacts \
                 GROUP BY stock_symbol, impact_type \
                 ORDER BY frequency DESC, stock_symbol ASC \
                 LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}
