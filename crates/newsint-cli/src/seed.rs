//! Bundled sample corpus and the `seed` command.
//!
//! The corpus mirrors a realistic day of Indian financial news and includes
//! one deliberate near-duplicate pair (the two rate-hike stories), so a
//! fresh database shows the deduplication path immediately.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use newsint_intel::{Enricher, NewsArticle};

pub(crate) struct SeedArticle {
    pub title: &'static str,
    pub content: &'static str,
    pub source: &'static str,
    pub url: &'static str,
    pub published_date: &'static str,
}

pub(crate) const SEED_ARTICLES: &[SeedArticle] = &[
    SeedArticle {
        title: "HDFC Bank announces 15% dividend, board approves stock buyback",
        content: "HDFC Bank Limited announced a dividend of 15% for FY2024, with the board also approving a share buyback program worth Rs 10,000 crore. The announcement comes as the bank reports strong Q4 earnings with net profit growth of 22% year-over-year. The buyback program is expected to enhance shareholder value and provide support to the stock price.",
        source: "Reuters",
        url: "https://example.com/hdfc-dividend-1",
        published_date: "2025-01-15",
    },
    SeedArticle {
        title: "Reserve Bank hikes interest rates by 0.25% in surprise move",
        content: "The Reserve Bank of India (RBI) announced an unexpected 25 basis point increase in the repo rate to 6.75%, citing persistent inflation concerns. This marks the third consecutive rate hike in the current monetary policy cycle. Analysts expect this move to impact borrowing costs across the banking sector and may slow down credit growth.",
        source: "Bloomberg",
        url: "https://example.com/rbi-rate-hike-1",
        published_date: "2025-01-16",
    },
    SeedArticle {
        title: "Central bank raises policy rate 25bps, signals hawkish stance",
        content: "In a closely watched monetary policy decision, the central bank raised the policy rate by 25 basis points to combat rising inflation. The decision signals a hawkish stance from the monetary authority, with officials indicating that further tightening may be necessary if inflation doesn't moderate in the coming quarters.",
        source: "Financial Times",
        url: "https://example.com/central-bank-rate-1",
        published_date: "2025-01-16",
    },
    SeedArticle {
        title: "ICICI Bank opens 500 new branches across Tier-2 cities",
        content: "ICICI Bank announced an aggressive expansion plan, opening 500 new branches across Tier-2 and Tier-3 cities in India. This expansion is part of the bank's strategy to increase its retail presence and capture growing demand in semi-urban markets. The initiative is expected to boost the bank's deposit base and loan portfolio.",
        source: "Economic Times",
        url: "https://example.com/icici-expansion-1",
        published_date: "2025-01-17",
    },
    SeedArticle {
        title: "Infosys reports 18% revenue growth in Q3, raises FY2024 guidance",
        content: "Infosys, India's second-largest IT services company, reported Q3 revenue growth of 18% in constant currency terms. The company also raised its full-year FY2024 revenue guidance to 12-14% growth, citing strong demand from clients in the financial services and healthcare sectors. The stock surged 5% on the announcement.",
        source: "CNBC",
        url: "https://example.com/infosys-q3-1",
        published_date: "2025-01-19",
    },
    SeedArticle {
        title: "TCS wins $500 million deal from European financial services firm",
        content: "Tata Consultancy Services (TCS) announced a major contract win worth $500 million from a leading European financial services company. The multi-year deal involves digital transformation and cloud migration services. This win strengthens TCS's position in the European market and is expected to contribute significantly to FY2024 revenues.",
        source: "Business Standard",
        url: "https://example.com/tcs-deal-1",
        published_date: "2025-01-20",
    },
    SeedArticle {
        title: "SEBI imposes restrictions on high-frequency trading to protect retail investors",
        content: "The Securities and Exchange Board of India (SEBI) announced new regulations restricting high-frequency trading practices to protect retail investors from market manipulation. The new rules include stricter position limits and enhanced surveillance mechanisms. Market analysts expect this to reduce volatility in equity markets.",
        source: "Indian Express",
        url: "https://example.com/sebi-hft-1",
        published_date: "2025-01-26",
    },
    SeedArticle {
        title: "Pharma sector sees 20% growth driven by generic drug exports",
        content: "India's pharmaceutical sector reported 20% growth in FY2024, driven by strong demand for generic drugs in international markets. Exports increased by 18% to $25 billion, with the US and European markets being key contributors. Industry experts expect this momentum to continue in FY2025.",
        source: "Pharma Pulse",
        url: "https://example.com/pharma-growth-1",
        published_date: "2025-01-28",
    },
    SeedArticle {
        title: "Dr. Reddy's Laboratories receives FDA approval for new diabetes drug",
        content: "Dr. Reddy's Laboratories announced FDA approval for its new diabetes management drug, expanding its portfolio in the therapeutic segment. The drug is expected to generate annual revenues of $150-200 million at peak sales. The stock surged 7% on the regulatory approval.",
        source: "Business Wire",
        url: "https://example.com/drreddy-fda-1",
        published_date: "2025-01-29",
    },
    SeedArticle {
        title: "Maruti Suzuki Q3 net profit declines 15% due to supply chain issues",
        content: "Maruti Suzuki reported a 15% decline in Q3 net profit, primarily due to semiconductor supply chain disruptions and increased raw material costs. However, the company maintained its full-year guidance, expecting supply normalization in Q4. The stock declined 4% on the earnings miss.",
        source: "Scroll.in",
        url: "https://example.com/maruti-q3-1",
        published_date: "2025-01-25",
    },
];

/// Ingest the bundled sample corpus through the full pipeline, printing a
/// per-article verdict line.
///
/// # Errors
///
/// Returns an error if an ingestion aborts (storage failure or, on a rerun
/// against an already-seeded database, a URL conflict).
pub(crate) async fn run_seed(pool: &SqlitePool, enricher: &Enricher) -> anyhow::Result<()> {
    println!("seeding {} sample articles", SEED_ARTICLES.len());

    for sample in SEED_ARTICLES {
        let published_date = NaiveDate::parse_from_str(sample.published_date, "%Y-%m-%d").ok();
        let article = NewsArticle {
            title: sample.title.to_string(),
            content: sample.content.to_string(),
            source: Some(sample.source.to_string()),
            url: Some(sample.url.to_string()),
            published_date,
        };

        let outcome = enricher.ingest(pool, article).await?;
        if outcome.is_duplicate {
            println!(
                "  [dup] #{} '{}' -> canonical #{} (similarity {:.3})",
                outcome.id,
                outcome.title,
                outcome.canonical_id.unwrap_or_default(),
                outcome.similarity.unwrap_or_default()
            );
        } else {
            let entity_count = outcome
                .entities
                .as_ref()
                .map(newsint_intel::ExtractedEntities::total)
                .unwrap_or_default();
            println!(
                "  [new] #{} '{}' ({entity_count} entities{})",
                outcome.id,
                outcome.title,
                if outcome.degraded_stages.is_empty() {
                    String::new()
                } else {
                    format!(", degraded: {}", outcome.degraded_stages.join(", "))
                }
            );
        }
    }

    Ok(())
}
