//! Database operations for the `duplicate_relations` audit table.

use sqlx::SqlitePool;

use crate::DbError;

/// Aggregated deduplication statistics across the corpus.
#[derive(Debug, Clone, Copy)]
pub struct DedupStats {
    pub total_articles: i64,
    pub unique_articles: i64,
    pub duplicate_articles: i64,
    /// Share of the corpus flagged duplicate, in percent. 0 for an empty corpus.
    pub deduplication_rate: f64,
    /// Mean similarity score of confirmed duplicate relations. 0 when none exist.
    pub average_similarity: f64,
}

/// Record a detected duplicate pair. Written exactly once, at detection time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_duplicate_relation(
    pool: &SqlitePool,
    canonical_id: i64,
    duplicate_id: i64,
    similarity_score: f64,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO duplicate_relations (canonical_id, duplicate_id, similarity_score, confirmed) \
         VALUES (?, ?, ?, 1) \
         RETURNING id",
    )
    .bind(canonical_id)
    .bind(duplicate_id)
    .bind(similarity_score)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Compute deduplication statistics for the whole corpus.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any of the count queries fail.
pub async fn dedup_stats(pool: &SqlitePool) -> Result<DedupStats, DbError> {
    let total_articles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(pool)
        .await?;

    let duplicate_articles: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE is_duplicate = 1")
            .fetch_one(pool)
            .await?;

    let unique_articles = total_articles - duplicate_articles;

    let average_similarity: f64 = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(similarity_score) FROM duplicate_relations WHERE confirmed = 1",
    )
    .fetch_one(pool)
    .await?
    .unwrap_or(0.0);

    #[allow(clippy::cast_precision_loss)]
    let deduplication_rate = if total_articles > 0 {
        duplicate_articles as f64 / total_articles as f64 * 100.0
    } else {
        0.0
    };

    Ok(DedupStats {
        total_articles,
        unique_articles,
        duplicate_articles,
        deduplication_rate,
        average_similarity,
    })
}
