//! Enrichment pipeline orchestration.
//!
//! [`Enricher`] is the only component with side effects. Per article the
//! stages run strictly in sequence:
//! embed → duplicate scan → persist → (unique only) entities → impacts →
//! sentiment. The article row is committed before enrichment, so a failed
//! enrichment leaves a visible, partially enriched article — accepted, not
//! rolled back. Collaborator failures degrade to defaults; only malformed
//! input and storage failures abort.

use std::collections::HashMap;

use sqlx::SqlitePool;

use newsint_core::AppConfig;
use newsint_db::{NewArticle, NewEntity, NewStockImpact};

use crate::analysis;
use crate::codec::{deserialize_vector, serialize_vector};
use crate::embeddings::EmbeddingClient;
use crate::error::{IntelError, PipelineError};
use crate::llm::CompletionClient;
use crate::ranker::rank;
use crate::similarity::is_duplicate;
use crate::types::{ContextAnswer, IngestOutcome, NewsArticle, SearchHit};

/// How many recent canonical articles ground a question answer.
const CONTEXT_ARTICLE_LIMIT: i64 = 10;

/// The enrichment capability object: both collaborator clients plus the
/// duplicate threshold, constructed once and injected wherever ingestion,
/// search, or answering happens.
#[derive(Debug, Clone)]
pub struct Enricher {
    embedder: EmbeddingClient,
    llm: CompletionClient,
    duplicate_threshold: f32,
}

impl Enricher {
    #[must_use]
    pub fn new(embedder: EmbeddingClient, llm: CompletionClient, duplicate_threshold: f32) -> Self {
        Self {
            embedder,
            llm,
            duplicate_threshold,
        }
    }

    /// Build both collaborator clients from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError::Http`] if either HTTP client cannot be
    /// constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, IntelError> {
        let embedder =
            EmbeddingClient::new(&config.embedding_url, config.collaborator_timeout_secs)?;
        let llm = CompletionClient::new(
            &config.llm_url,
            config.llm_api_key.as_deref(),
            &config.llm_model,
            config.collaborator_timeout_secs,
        )?;

        Ok(Self::new(embedder, llm, config.duplicate_threshold))
    }

    /// Run the full ingestion pipeline for one article.
    ///
    /// 1. Reject empty title or content before any collaborator call.
    /// 2. Fingerprint the content (zero vector on embedding failure).
    /// 3. Scan canonical articles in insertion order; the first candidate
    ///    meeting the threshold becomes the canonical reference.
    /// 4. Persist the article row, then the duplicate relation (duplicates)
    ///    or the enrichment rows (unique articles).
    ///
    /// Duplicates skip enrichment entirely.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for empty title or content,
    /// or [`PipelineError::Db`] if any insert or query fails — including
    /// [`newsint_db::DbError::UniqueViolation`] for an already-stored URL.
    pub async fn ingest(
        &self,
        pool: &SqlitePool,
        article: NewsArticle,
    ) -> Result<IngestOutcome, PipelineError> {
        if article.title.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "article title must not be empty".to_string(),
            ));
        }
        if article.content.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "article content must not be empty".to_string(),
            ));
        }

        let mut degraded_stages = Vec::new();

        let embedded = self.embedder.embed_or_zero(&article.content).await;
        if embedded.is_degraded() {
            degraded_stages.push("embedding");
        }
        let fingerprint = embedded.into_value();

        // First-match scan: insertion order decides which existing article
        // becomes canonical when several exceed the threshold.
        let scan_set = newsint_db::list_canonical_embeddings(pool).await?;
        let mut verdict: Option<(i64, f32)> = None;
        for candidate in &scan_set {
            let stored = deserialize_vector(&candidate.embedding);
            let (matched, score) = is_duplicate(&fingerprint, &stored, self.duplicate_threshold);
            if matched {
                verdict = Some((candidate.id, score));
                break;
            }
        }

        let blob = serialize_vector(&fingerprint);
        let id = newsint_db::insert_article(
            pool,
            &NewArticle {
                title: &article.title,
                content: &article.content,
                source: article.source.as_deref(),
                url: article.url.as_deref(),
                published_date: article.published_date,
                embedding: &blob,
                is_duplicate: verdict.is_some(),
                canonical_id: verdict.map(|(canonical_id, _)| canonical_id),
            },
        )
        .await?;

        if let Some((canonical_id, score)) = verdict {
            newsint_db::insert_duplicate_relation(pool, canonical_id, id, f64::from(score))
                .await?;
            tracing::info!(
                article_id = id,
                canonical_id,
                similarity = score,
                "duplicate detected, enrichment skipped"
            );

            return Ok(IngestOutcome {
                id,
                title: article.title,
                is_duplicate: true,
                canonical_id: Some(canonical_id),
                similarity: Some(f64::from(score)),
                entities: None,
                sentiment: None,
                degraded_stages,
            });
        }

        let extracted = analysis::extract_entities(&self.llm, &article.content).await;
        if extracted.is_degraded() {
            degraded_stages.push("entity-extraction");
        }
        let entities = extracted.into_value();

        for (category, mentions) in entities.by_category() {
            for mention in mentions {
                newsint_db::insert_entity(
                    pool,
                    &NewEntity {
                        article_id: id,
                        entity_text: mention,
                        entity_type: category.as_str(),
                        confidence: 1.0,
                    },
                )
                .await?;
            }
        }

        // One independent classification call per company/sector mention;
        // a failing entity degrades alone and never blocks the others.
        let mut impacts_degraded = false;
        for mention in entities.companies.iter().chain(entities.sectors.iter()) {
            let mapped = analysis::map_stock_impact(&self.llm, &article.content, mention).await;
            if mapped.is_degraded() {
                impacts_degraded = true;
            }
            for stock in mapped.into_value() {
                newsint_db::insert_stock_impact(
                    pool,
                    &NewStockImpact {
                        article_id: id,
                        stock_symbol: &stock.symbol,
                        impact_type: stock.impact_type.as_str(),
                        confidence: stock.confidence.clamp(0.0, 1.0),
                        sentiment: stock.sentiment.as_deref(),
                    },
                )
                .await?;
            }
        }
        if impacts_degraded {
            degraded_stages.push("impact-mapping");
        }

        // Sentiment runs once per unique article even when no entities were
        // found.
        let scored = analysis::analyze_sentiment(&self.llm, &article.content).await;
        if scored.is_degraded() {
            degraded_stages.push("sentiment");
        }

        tracing::info!(
            article_id = id,
            entity_count = entities.total(),
            degraded = degraded_stages.len(),
            "article ingested"
        );

        Ok(IngestOutcome {
            id,
            title: article.title,
            is_duplicate: false,
            canonical_id: None,
            similarity: None,
            entities: Some(entities),
            sentiment: Some(scored.into_value()),
            degraded_stages,
        })
    }

    /// Keyword-free search over the canonical corpus.
    ///
    /// The query is fingerprinted fail-soft: on an embedding outage every
    /// candidate scores zero and the (stable-ordered) list still comes back.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for an empty query, or
    /// [`PipelineError::Db`] if loading candidates fails.
    pub async fn search(
        &self,
        pool: &SqlitePool,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, PipelineError> {
        if query.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "search query must not be empty".to_string(),
            ));
        }

        let query_vector = self.embedder.embed_or_zero(query).await;

        let candidates = newsint_db::list_search_candidates(pool).await?;
        let items: Vec<(i64, Vec<f32>)> = candidates
            .iter()
            .map(|candidate| (candidate.id, deserialize_vector(&candidate.embedding)))
            .collect();
        let titles: HashMap<i64, &str> = candidates
            .iter()
            .map(|candidate| (candidate.id, candidate.title.as_str()))
            .collect();

        let hits = rank(query_vector.value(), &items, top_k)
            .into_iter()
            .map(|matched| SearchHit {
                id: matched.id,
                title: titles
                    .get(&matched.id)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                score: matched.score,
            })
            .collect();

        Ok(hits)
    }

    /// Answer a free-text question grounded in the most recent canonical
    /// articles.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for an empty question, or
    /// [`PipelineError::Db`] if loading the context articles fails.
    pub async fn answer(
        &self,
        pool: &SqlitePool,
        question: &str,
    ) -> Result<ContextAnswer, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        let context = newsint_db::list_recent_canonical(pool, CONTEXT_ARTICLE_LIMIT).await?;
        let answered = analysis::answer_with_context(&self.llm, question, &context).await;

        Ok(ContextAnswer {
            degraded: answered.is_degraded(),
            context_count: context.len(),
            response: answered.into_value(),
        })
    }
}
