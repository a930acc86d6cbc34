//! Batch ingest entry point.
//!
//! Reads observation records and runs each through the ingest pipeline
//! against the SQLite store. Page fetching stays outside this binary; inputs
//! are either pre-extracted observations (JSON lines, one
//! `{"name", "price", "url", "store"}` object per line) from a file or
//! stdin, or a single saved markup file run through the extraction rules:
//!
//! ```text
//! pricetrail observations.jsonl
//! cat observations.jsonl | pricetrail
//! pricetrail --markup page.html --url http://x/1 --store MarketplaceX
//! ```
//!
//! The database path comes from `PRICETRAIL_DB` (default `data/prices.db`).

use std::io::BufRead;

use anyhow::{bail, Context, Result};

use pricetrail_infra::{IngestPipeline, SqliteStore, StoreConfig};
use pricetrail_scrape::{extract_observation, Observation};

#[tokio::main]
async fn main() -> Result<()> {
    pricetrail_observability::init();

    let db_path = std::env::var("PRICETRAIL_DB").unwrap_or_else(|_| "data/prices.db".to_string());
    let store = SqliteStore::connect(&StoreConfig::file(&db_path))
        .await
        .with_context(|| format!("failed to open price database at {db_path}"))?;
    tracing::info!(path = %db_path, "price database ready");

    let pipeline = IngestPipeline::new(store);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let observations = gather_observations(&args)?;

    let mut recorded = 0usize;
    let mut failed = 0usize;
    for observation in observations {
        let url = observation.url.clone();
        match pipeline.ingest(observation).await {
            Ok(stored) => {
                recorded += 1;
                tracing::info!(url = %url, price = %stored.price(), "price recorded");
            }
            Err(e) if e.is_retryable() => {
                failed += 1;
                tracing::warn!(url = %url, error = %e, "transient failure, record skipped (safe to retry)");
            }
            Err(e) => {
                failed += 1;
                tracing::error!(url = %url, error = %e, "observation rejected");
            }
        }
    }

    tracing::info!(recorded, failed, "ingest run finished");
    pipeline.store().close().await;
    if recorded == 0 && failed > 0 {
        bail!("no observation could be recorded");
    }
    Ok(())
}

fn gather_observations(args: &[String]) -> Result<Vec<Observation>> {
    match args {
        [] => read_json_lines(std::io::stdin().lock()),
        [path] if !path.starts_with("--") => {
            let file = std::fs::File::open(path).with_context(|| format!("failed to open {path}"))?;
            read_json_lines(std::io::BufReader::new(file))
        }
        _ => extract_from_markup(args),
    }
}

fn read_json_lines(reader: impl BufRead) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let observation: Observation = serde_json::from_str(&line)
            .with_context(|| format!("malformed observation on line {}", number + 1))?;
        observations.push(observation);
    }
    Ok(observations)
}

fn extract_from_markup(args: &[String]) -> Result<Vec<Observation>> {
    let mut markup_path = None;
    let mut url = None;
    let mut store_label = None;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--markup" => markup_path = Some(value.clone()),
            "--url" => url = Some(value.clone()),
            "--store" => store_label = Some(value.clone()),
            other => bail!("unknown argument: {other}"),
        }
    }

    let markup_path = markup_path.context("--markup <file> is required")?;
    let url = url.context("--url <url> is required with --markup")?;
    let markup = std::fs::read_to_string(&markup_path)
        .with_context(|| format!("failed to read {markup_path}"))?;

    let observation = extract_observation(&url, store_label.as_deref().unwrap_or(""), &markup)
        .with_context(|| format!("extraction failed for {markup_path}"))?;
    Ok(vec![observation])
}
