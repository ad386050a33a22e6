mod seed;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use newsint_intel::{Enricher, NewsArticle};

#[derive(Debug, Parser)]
#[command(name = "newsint-cli")]
#[command(about = "Financial news intelligence command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest the bundled sample corpus through the full pipeline
    Seed,
    /// Ingest a single article
    Ingest {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// Publication date, ISO format (e.g. 2025-01-16)
        #[arg(long)]
        published_date: Option<NaiveDate>,
    },
    /// Semantic search over the stored corpus
    Search {
        query: String,

        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
    /// Ask a question grounded in the most recent articles
    Ask { question: String },
    /// Show deduplication and corpus statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = newsint_core::load_app_config()?;
    let pool = newsint_db::connect_pool(
        &config.database_url,
        newsint_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    newsint_db::run_migrations(&pool).await?;
    let enricher = Enricher::from_app_config(&config)?;

    match cli.command {
        Commands::Seed => seed::run_seed(&pool, &enricher).await?,
        Commands::Ingest {
            title,
            content,
            source,
            url,
            published_date,
        } => {
            run_ingest(
                &pool,
                &enricher,
                NewsArticle {
                    title,
                    content,
                    source,
                    url,
                    published_date,
                },
            )
            .await?;
        }
        Commands::Search { query, top_k } => run_search(&pool, &enricher, &query, top_k).await?,
        Commands::Ask { question } => run_ask(&pool, &enricher, &question).await?,
        Commands::Stats => run_stats(&pool).await?,
    }

    Ok(())
}

async fn run_ingest(
    pool: &SqlitePool,
    enricher: &Enricher,
    article: NewsArticle,
) -> anyhow::Result<()> {
    let outcome = enricher.ingest(pool, article).await?;

    if outcome.is_duplicate {
        println!(
            "duplicate of article #{} (similarity {:.3})",
            outcome.canonical_id.unwrap_or_default(),
            outcome.similarity.unwrap_or_default()
        );
        return Ok(());
    }

    println!("stored article #{}", outcome.id);
    if let Some(entities) = &outcome.entities {
        for (category, mentions) in entities.by_category() {
            if !mentions.is_empty() {
                println!("  {category}: {}", mentions.join(", "));
            }
        }
    }
    if let Some(sentiment) = &outcome.sentiment {
        println!(
            "  sentiment: {:?} (score {:.2}, {:?}/{:?})",
            sentiment.sentiment,
            sentiment.sentiment_score,
            sentiment.price_impact,
            sentiment.impact_magnitude
        );
    }
    if !outcome.degraded_stages.is_empty() {
        println!("  degraded stages: {}", outcome.degraded_stages.join(", "));
    }

    Ok(())
}

async fn run_search(
    pool: &SqlitePool,
    enricher: &Enricher,
    query: &str,
    top_k: usize,
) -> anyhow::Result<()> {
    let hits = enricher.search(pool, query, top_k).await?;

    if hits.is_empty() {
        println!("no matching articles");
        return Ok(());
    }

    for hit in hits {
        println!("{:>8.3}  #{:<5} {}", hit.score, hit.id, hit.title);
    }

    Ok(())
}

async fn run_ask(pool: &SqlitePool, enricher: &Enricher, question: &str) -> anyhow::Result<()> {
    let answer = enricher.answer(pool, question).await?;

    println!("{}", answer.response);
    println!(
        "\n({} context articles{})",
        answer.context_count,
        if answer.degraded { ", degraded" } else { "" }
    );

    Ok(())
}

async fn run_stats(pool: &SqlitePool) -> anyhow::Result<()> {
    let dedup = newsint_db::dedup_stats(pool).await?;
    let corpus = newsint_db::corpus_stats(pool).await?;

    println!("articles:");
    println!("  total      {}", dedup.total_articles);
    println!("  unique     {}", dedup.unique_articles);
    println!("  duplicates {}", dedup.duplicate_articles);
    println!("  dedup rate {:.2}%", dedup.deduplication_rate);
    println!("  mean dup similarity {:.3}", dedup.average_similarity);

    println!("entities: {} distinct across {} categories", corpus.unique_entity_count, corpus.entity_type_count);
    for entity in &corpus.top_entities {
        println!("  {:>4}  {} ({})", entity.frequency, entity.entity_text, entity.entity_type);
    }

    println!("stocks: {} distinct symbols", corpus.unique_stock_count);
    for stock in &corpus.top_stocks {
        println!(
            "  {:>4}  {} (avg confidence {:.3})",
            stock.frequency, stock.stock_symbol, stock.avg_confidence
        );
    }

    Ok(())
}
