//! Database operations for the `entities` table.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

/// A row from the `entities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub article_id: i64,
    pub entity_text: String,
    pub entity_type: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

/// An aggregated (text, type) pair with its mention count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntityFrequencyRow {
    pub entity_text: String,
    pub entity_type: String,
    pub frequency: i64,
}

/// Fields for a new entity mention insert.
#[derive(Debug)]
pub struct NewEntity<'a> {
    pub article_id: i64,
    pub entity_text: &'a str,
    pub entity_type: &'a str,
    pub confidence: f64,
}

/// Insert an entity mention and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_entity(pool: &SqlitePool, entity: &NewEntity<'_>) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO entities (article_id, entity_text, entity_type, confidence) \
         VALUES (?, ?, ?, ?) \
         RETURNING id",
    )
    .bind(entity.article_id)
    .bind(entity.entity_text)
    .bind(entity.entity_type)
    .bind(entity.confidence)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List all entity mentions for one article, in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entities_for_article(
    pool: &SqlitePool,
    article_id: i64,
) -> Result<Vec<EntityRow>, DbError> {
    let rows = sqlx::query_as::<_, EntityRow>(
        "SELECT id, article_id, entity_text, entity_type, confidence, created_at \
         FROM entities WHERE article_id = ? \
         ORDER BY id ASC",
    )
    .bind(article_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// List entity mention frequencies across the corpus, most frequent first,
/// optionally filtered by category tag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entity_frequencies(
    pool: &SqlitePool,
    entity_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EntityFrequencyRow>, DbError> {
    let rows = match entity_type {
        Some(kind) => {
            sqlx::query_as::<_, EntityFrequencyRow>(
                "SELECT entity_text, entity_type, COUNT(*) AS frequency \
                 FROM entities WHERE entity_type = ? \
                 GROUP BY entity_text, entity_type \
                 ORDER BY frequency DESC, entity_text ASC \
                 LIMIT ? OFFSET ?",
            )
            .bind(kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, EntityFrequencyRow>(
                "SELECT entity_text, entity_type, COUNT(*) AS frequency \
                 FROM entities \
                 GROUP BY entity_text, entity_type \
                 ORDER BY frequency DESC, entity_text ASC \
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
