//! Ingestion pipeline and similarity engine for newsint.
//!
//! Turns raw article text into a fixed-length fingerprint, a duplicate or
//! canonical verdict against the stored corpus, and ranked similarity
//! results for search queries. Embeddings come from a TEI service and the
//! enrichment analyses from an OpenAI-compatible completion service; both
//! are consumed fail-soft, with documented degraded defaults.

pub mod analysis;
pub mod codec;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod ranker;
pub mod similarity;
pub mod types;

mod json;

pub use codec::{deserialize_vector, serialize_vector, zero_vector, EMBEDDING_DIM};
pub use embeddings::EmbeddingClient;
pub use error::{IntelError, PipelineError};
pub use llm::CompletionClient;
pub use pipeline::Enricher;
pub use ranker::{rank, RankedMatch};
pub use similarity::{cosine_similarity, is_duplicate, DEFAULT_DUPLICATE_THRESHOLD};
pub use types::{
    ContextAnswer, DuplicateReasoning, EntityCategory, ExtractedEntities, ImpactKind,
    ImpactMagnitude, IngestOutcome, NewsArticle, PriceImpact, SearchHit, SentimentAnalysis,
    SentimentLabel, Sourced, StockImpactPrediction,
};
