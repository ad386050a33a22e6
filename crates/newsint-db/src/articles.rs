//! Database operations for the `articles` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{map_insert_error, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A full row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub embedding: Vec<u8>,
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A listing row without the content body or embedding blob.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleSummaryRow {
    pub id: i64,
    pub title: String,
    pub source: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// The duplicate-detection scan set: one canonical article's id and stored
/// fingerprint blob.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CanonicalEmbeddingRow {
    pub id: i64,
    pub embedding: Vec<u8>,
}

/// A semantic-search candidate: canonical article id, title, and fingerprint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchCandidateRow {
    pub id: i64,
    pub title: String,
    pub embedding: Vec<u8>,
}

/// A context article for question answering.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContextArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
}

/// Fields for a new article insert. The embedding blob, duplicate flag, and
/// canonical reference are fixed here and never updated afterwards.
#[derive(Debug)]
pub struct NewArticle<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub source: Option<&'a str>,
    pub url: Option<&'a str>,
    pub published_date: Option<NaiveDate>,
    pub embedding: &'a [u8],
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new article and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::UniqueViolation`] if the article URL is already stored,
/// or [`DbError::Sqlx`] on any other query failure.
pub async fn insert_article(pool: &SqlitePool, article: &NewArticle<'_>) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO articles \
             (title, content, source, url, published_date, embedding, is_duplicate, canonical_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
         RETURNING id",
    )
    .bind(article.title)
    .bind(article.content)
    .bind(article.source)
    .bind(article.url)
    .bind(article.published_date)
    .bind(article.embedding)
    .bind(article.is_duplicate)
    .bind(article.canonical_id)
    .fetch_one(pool)
    .await
    .map_err(map_insert_error)?;

    Ok(id)
}

/// Fetch a single article by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_article(pool: &SqlitePool, id: i64) -> Result<Option<ArticleRow>, DbError> {
    let row = sqlx::query_as::<_, ArticleRow>(
        "SELECT id, title, content, source, url, published_date, embedding, \
                is_duplicate, canonical_id, created_at \
         FROM articles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// List article summaries, newest first.
///
/// With `unique_only`, duplicate articles are excluded from the listing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_articles(
    pool: &SqlitePool,
    unique_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ArticleSummaryRow>, DbError> {
    let rows = if unique_only {
        sqlx::query_as::<_, ArticleSummaryRow>(
            "SELECT id, title, source, published_date, is_duplicate, canonical_id, created_at \
             FROM articles WHERE is_duplicate = 0 \
             ORDER BY created_at DESC, id DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, ArticleSummaryRow>(
            "SELECT id, title, source, published_date, is_duplicate, canonical_id, created_at \
             FROM articles \
             ORDER BY created_at DESC, id DESC \
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

/// Load the duplicate-detection scan set: all canonical (non-duplicate)
/// articles in insertion order.
///
/// The ascending-id order is load-bearing: the detector stops at the first
/// candidate meeting the threshold, so scan order decides which article
/// becomes canonical.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_canonical_embeddings(
    pool: &SqlitePool,
) -> Result<Vec<CanonicalEmbeddingRow>, DbError> {
    let rows = sqlx::query_as::<_, CanonicalEmbeddingRow>(
        "SELECT id, embedding FROM articles WHERE is_duplicate = 0 ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load all canonical articles as semantic-search candidates, in insertion
/// order (the ranker's tie-break is stable by input order).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_candidates(pool: &SqlitePool) -> Result<Vec<SearchCandidateRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchCandidateRow>(
        "SELECT id, title, embedding FROM articles WHERE is_duplicate = 0 ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load the most recent canonical articles for question-answering context.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_canonical(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<ContextArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ContextArticleRow>(
        "SELECT id, title, content FROM articles WHERE is_duplicate = 0 \
         ORDER BY created_at DESC, id DESC \
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
