use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A value together with its provenance: produced by a collaborator, or a
/// documented fallback default substituted after a collaborator failure.
///
/// This is what lets callers tell a genuine empty result ("the model found
/// no entities") apart from a degraded one ("entity extraction failed").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    /// The collaborator produced this value.
    Computed(T),
    /// The collaborator failed; this is the fallback default.
    Degraded(T),
}

impl<T> Sourced<T> {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Sourced::Degraded(_))
    }

    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Sourced::Computed(value) | Sourced::Degraded(value) => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Sourced::Computed(value) | Sourced::Degraded(value) => value,
        }
    }
}

/// The closed set of entity category tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCategory {
    Company,
    Sector,
    Regulator,
    Person,
    Event,
}

impl EntityCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityCategory::Company => "company",
            EntityCategory::Sector => "sector",
            EntityCategory::Regulator => "regulator",
            EntityCategory::Person => "person",
            EntityCategory::Event => "event",
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named entities extracted from one article, keyed by category.
///
/// Field names match the extraction schema the model is asked to produce;
/// any missing key deserializes to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedEntities {
    pub companies: Vec<String>,
    pub sectors: Vec<String>,
    pub regulators: Vec<String>,
    pub people: Vec<String>,
    pub events: Vec<String>,
}

impl ExtractedEntities {
    /// All (category, mentions) pairs, in schema order.
    #[must_use]
    pub fn by_category(&self) -> [(EntityCategory, &[String]); 5] {
        [
            (EntityCategory::Company, self.companies.as_slice()),
            (EntityCategory::Sector, self.sectors.as_slice()),
            (EntityCategory::Regulator, self.regulators.as_slice()),
            (EntityCategory::Person, self.people.as_slice()),
            (EntityCategory::Event, self.events.as_slice()),
        ]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.by_category()
            .iter()
            .map(|(_, mentions)| mentions.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// How an article's news affects a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactKind {
    Direct,
    Sector,
    Regulatory,
}

impl ImpactKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImpactKind::Direct => "direct",
            ImpactKind::Sector => "sector",
            ImpactKind::Regulatory => "regulatory",
        }
    }
}

fn default_impact_confidence() -> f64 {
    0.5
}

/// One instrument the model predicts to be affected by an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockImpactPrediction {
    pub symbol: String,
    #[serde(default = "default_impact_confidence")]
    pub confidence: f64,
    pub impact_type: ImpactKind,
    #[serde(default)]
    pub sentiment: Option<String>,
}

/// Envelope the stock-impact schema arrives in: `{"stocks": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StockImpactPayload {
    pub stocks: Vec<StockImpactPrediction>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceImpact {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactMagnitude {
    High,
    Medium,
    #[default]
    Low,
}

/// Article-level sentiment verdict. The `Default` value is the documented
/// neutral fallback used when the model call or parse fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentAnalysis {
    pub sentiment: SentimentLabel,
    pub sentiment_score: f64,
    pub price_impact: PriceImpact,
    pub impact_magnitude: ImpactMagnitude,
    pub reasoning: Option<String>,
}

/// The duplicate-reasoning schema: the model's judgement on whether two
/// articles cover the same story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateReasoning {
    pub is_duplicate: bool,
    pub similarity_score: f64,
    pub reasoning: Option<String>,
}

/// Raw article input to the ingestion pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
}

/// The pipeline's verdict and enrichment output for one ingested article.
///
/// Duplicates skip enrichment entirely, so `entities` and `sentiment` are
/// `None` for them by construction. `degraded_stages` names the stages that
/// fell back to defaults; an empty list means a fully clean run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub id: i64,
    pub title: String,
    pub is_duplicate: bool,
    pub canonical_id: Option<i64>,
    pub similarity: Option<f64>,
    pub entities: Option<ExtractedEntities>,
    pub sentiment: Option<SentimentAnalysis>,
    pub degraded_stages: Vec<&'static str>,
}

/// One semantic-search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    pub score: f32,
}

/// A context-grounded answer to a free-text question.
#[derive(Debug, Clone, Serialize)]
pub struct ContextAnswer {
    pub response: String,
    pub context_count: usize,
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sourced_reports_degradation() {
        let computed = Sourced::Computed(3);
        let degraded = Sourced::Degraded(0);

        assert!(!computed.is_degraded());
        assert!(degraded.is_degraded());
        assert_eq!(*computed.value(), 3);
        assert_eq!(degraded.into_value(), 0);
    }

    #[test]
    fn extracted_entities_default_is_empty() {
        let entities = ExtractedEntities::default();
        assert!(entities.is_empty());
        assert_eq!(entities.total(), 0);
    }

    #[test]
    fn extracted_entities_parse_with_missing_keys() {
        let entities: ExtractedEntities =
            serde_json::from_str(r#"{"companies": ["HDFC Bank"]}"#).expect("parse");
        assert_eq!(entities.companies, vec!["HDFC Bank"]);
        assert!(entities.sectors.is_empty());
        assert_eq!(entities.total(), 1);
    }

    #[test]
    fn sentiment_default_is_neutral() {
        let sentiment = SentimentAnalysis::default();
        assert_eq!(sentiment.sentiment, SentimentLabel::Neutral);
        assert_eq!(sentiment.price_impact, PriceImpact::Neutral);
        assert_eq!(sentiment.impact_magnitude, ImpactMagnitude::Low);
        assert!((sentiment.sentiment_score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stock_impact_confidence_defaults_when_missing() {
        let stock: StockImpactPrediction =
            serde_json::from_str(r#"{"symbol": "INFY", "impact_type": "direct"}"#).expect("parse");
        assert_eq!(stock.symbol, "INFY");
        assert!((stock.confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(stock.impact_type, ImpactKind::Direct);
    }

    #[test]
    fn impact_kind_round_trips_lowercase() {
        let json = serde_json::to_string(&ImpactKind::Regulatory).expect("serialize");
        assert_eq!(json, r#""regulatory""#);
        let parsed: ImpactKind = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, ImpactKind::Regulatory);
    }
}
