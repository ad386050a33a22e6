//! Model-backed enrichment operations: entity extraction, stock-impact
//! classification, sentiment scoring, duplicate reasoning, and grounded
//! question answering.
//!
//! Every operation here is fail-soft: one attempt against the completion
//! service, defensive JSON recovery, and a documented default on any
//! failure. The [`Sourced`] wrapper records which of the two happened.

use newsint_db::ContextArticleRow;

use crate::json::extract_json_object;
use crate::llm::CompletionClient;
use crate::types::{
    DuplicateReasoning, ExtractedEntities, SentimentAnalysis, Sourced, StockImpactPayload,
    StockImpactPrediction,
};

/// Articles are truncated to this many characters for pairwise duplicate
/// reasoning, which only needs the lede.
const DUPLICATE_SNIPPET_CHARS: usize = 500;

/// At most this many articles feed the question-answering context block.
const CONTEXT_ARTICLES: usize = 5;

/// Per-article content cap inside the context block.
const CONTEXT_CONTENT_CHARS: usize = 300;

/// Extract named entities from an article.
///
/// Falls back to the empty entity set on any failure.
pub async fn extract_entities(llm: &CompletionClient, text: &str) -> Sourced<ExtractedEntities> {
    let prompt = format!(
        "Analyze the following financial news article and extract entities in JSON format.\n\
         \n\
         Article:\n{text}\n\
         \n\
         Extract and return a JSON object with these entity types:\n\
         - companies: List of company names mentioned\n\
         - sectors: List of sectors/industries affected\n\
         - regulators: List of regulatory bodies mentioned\n\
         - people: List of key people mentioned\n\
         - events: List of key events mentioned\n\
         \n\
         Return ONLY valid JSON, no other text."
    );

    match completion_as::<ExtractedEntities>(llm, &prompt, 1024).await {
        Ok(entities) => Sourced::Computed(entities),
        Err(e) => {
            tracing::warn!(error = %e, "entity extraction failed, substituting empty set");
            Sourced::Degraded(ExtractedEntities::default())
        }
    }
}

/// Classify which instruments are affected by an article's news about one
/// extracted entity.
///
/// Falls back to an empty mapping on any failure; each entity's call is
/// independent, so callers can isolate failures per entity.
pub async fn map_stock_impact(
    llm: &CompletionClient,
    text: &str,
    entity: &str,
) -> Sourced<Vec<StockImpactPrediction>> {
    let prompt = format!(
        "For the financial news article below, identify which stocks would be impacted \
         by the news about \"{entity}\".\n\
         \n\
         Article:\n{text}\n\
         \n\
         Return a JSON object with:\n\
         - stocks: List of objects with:\n\
           - symbol: Stock ticker symbol (e.g., HDFCBANK, INFY)\n\
           - confidence: Confidence score 0-1 (1.0 for direct mention, 0.6-0.8 for \
         sector-wide, variable for regulatory)\n\
           - impact_type: \"direct\", \"sector\", or \"regulatory\"\n\
         \n\
         Return ONLY valid JSON."
    );

    match completion_as::<StockImpactPayload>(llm, &prompt, 512).await {
        Ok(payload) => Sourced::Computed(payload.stocks),
        Err(e) => {
            tracing::warn!(entity, error = %e, "stock impact mapping failed, substituting empty list");
            Sourced::Degraded(Vec::new())
        }
    }
}

/// Score an article's sentiment and likely price impact.
///
/// Falls back to the neutral verdict on any failure.
pub async fn analyze_sentiment(llm: &CompletionClient, text: &str) -> Sourced<SentimentAnalysis> {
    let prompt = format!(
        "Analyze the sentiment of this financial news article and predict its potential \
         price impact.\n\
         \n\
         Article:\n{text}\n\
         \n\
         Return a JSON object with:\n\
         - sentiment: \"positive\", \"negative\", or \"neutral\"\n\
         - sentiment_score: -1 to 1 (negative to positive)\n\
         - price_impact: \"bullish\", \"bearish\", or \"neutral\"\n\
         - impact_magnitude: \"high\", \"medium\", or \"low\"\n\
         - reasoning: brief explanation\n\
         \n\
         Return ONLY valid JSON."
    );

    match completion_as::<SentimentAnalysis>(llm, &prompt, 256).await {
        Ok(sentiment) => Sourced::Computed(sentiment),
        Err(e) => {
            tracing::warn!(error = %e, "sentiment analysis failed, substituting neutral verdict");
            Sourced::Degraded(SentimentAnalysis::default())
        }
    }
}

/// Ask the model whether two article texts cover the same story.
///
/// Exposed for analytics; the ingestion pipeline decides duplicates from
/// fingerprints, not from this. Falls back to a zero-score non-duplicate
/// verdict; a bare `similarity_score` number is recovered by regex even
/// when the surrounding JSON is unusable.
pub async fn score_duplicate_pair(
    llm: &CompletionClient,
    article_a: &str,
    article_b: &str,
) -> Sourced<DuplicateReasoning> {
    let prompt = format!(
        "Compare these two financial news articles and determine if they cover the same story.\n\
         \n\
         Article 1:\n{}\n\
         \n\
         Article 2:\n{}\n\
         \n\
         Return a JSON object with:\n\
         - is_duplicate: boolean (true if same story, false if different)\n\
         - similarity_score: number between 0 and 1\n\
         - reasoning: brief explanation\n\
         \n\
         Return ONLY valid JSON.",
        truncate_chars(article_a, DUPLICATE_SNIPPET_CHARS),
        truncate_chars(article_b, DUPLICATE_SNIPPET_CHARS),
    );

    let completion = match llm.complete(&prompt, 256).await {
        Ok(completion) => completion,
        Err(e) => {
            tracing::warn!(error = %e, "duplicate reasoning failed, substituting zero score");
            return Sourced::Degraded(DuplicateReasoning::default());
        }
    };

    if let Some(value) = extract_json_object(&completion) {
        if let Ok(reasoning) = serde_json::from_value::<DuplicateReasoning>(value) {
            return Sourced::Computed(reasoning);
        }
    }

    if let Some(score) = recover_similarity_score(&completion) {
        return Sourced::Computed(DuplicateReasoning {
            is_duplicate: false,
            similarity_score: score,
            reasoning: None,
        });
    }

    tracing::warn!("duplicate reasoning completion unusable, substituting zero score");
    Sourced::Degraded(DuplicateReasoning::default())
}

/// Answer a free-text question grounded in the supplied articles.
///
/// Falls back to a fixed apology string on any failure.
pub async fn answer_with_context(
    llm: &CompletionClient,
    query: &str,
    articles: &[ContextArticleRow],
) -> Sourced<String> {
    let context_block = articles
        .iter()
        .take(CONTEXT_ARTICLES)
        .map(|article| {
            format!(
                "Article: {}\n{}",
                article.title,
                truncate_chars(&article.content, CONTEXT_CONTENT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = format!(
        "A user is asking about financial news. Answer their query based on the provided \
         articles.\n\
         \n\
         User Query: {query}\n\
         \n\
         Relevant Articles:\n{context_block}\n\
         \n\
         Provide a concise, informative answer based on the articles. If the query is \
         about a company, include sector-wide implications. If about a sector, summarize \
         impacts across companies."
    );

    match llm.complete(&prompt, 512).await {
        Ok(answer) => Sourced::Computed(answer),
        Err(e) => {
            tracing::warn!(error = %e, "context answer failed, substituting apology");
            Sourced::Degraded("Unable to process query at this time.".to_string())
        }
    }
}

/// Run one completion and deserialize the first JSON object it contains.
async fn completion_as<T: serde::de::DeserializeOwned>(
    llm: &CompletionClient,
    prompt: &str,
    max_tokens: u32,
) -> Result<T, String> {
    let completion = llm
        .complete(prompt, max_tokens)
        .await
        .map_err(|e| e.to_string())?;

    let value =
        extract_json_object(&completion).ok_or_else(|| "no JSON object in completion".to_string())?;

    serde_json::from_value(value).map_err(|e| format!("completion JSON mismatch: {e}"))
}

/// Pull a bare `"similarity_score": <number>` out of an otherwise unusable
/// completion.
fn recover_similarity_score(completion: &str) -> Option<f64> {
    let pattern = regex::Regex::new(r#""similarity_score"\s*:\s*([0-9]*\.?[0-9]+)"#).ok()?;
    pattern
        .captures(completion)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
