//! credit-cli: score companies and screen the portfolio from a JSON dataset.
//!
//! The dataset holds `records`, `transactions` and optional precomputed
//! `snapshots` (see `credit_core::Dataset`). Every command prints JSON.
//!
//! Usage:
//!   credit-cli company C001 --data portfolio.json
//!   credit-cli cohorts --period 2025-03
//!   credit-cli stats
//!   credit-cli ranking --limit 20
//!   credit-cli sectors
//!   credit-cli periods

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use credit_core::{Dataset, InMemorySource};
use credit_scoring::{CompanyReport, ScoringEngine};
use portfolio_screener::{PortfolioAggregator, ScreenerConfig};
use serde::Serialize;

/// Infinite runway is shown as this many months
const RUNWAY_DISPLAY_CAP: f64 = 999.0;
const DEFAULT_RANKING_LIMIT: usize = 10;

fn init_logging() {
    let default_filter = "credit_cli=info,portfolio_screener=info,credit_scoring=warn";
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .init();
    }
}

fn usage() -> ! {
    eprintln!("Usage:");
    eprintln!("  credit-cli company ID          Full report for one company");
    eprintln!("  credit-cli cohorts             Ideal and high-risk cohorts");
    eprintln!("  credit-cli stats               Portfolio statistics for a period");
    eprintln!("  credit-cli ranking             Companies by composite credit score");
    eprintln!("  credit-cli sectors             Per-sector summary");
    eprintln!("  credit-cli periods             Reporting months in the dataset");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data PATH        Dataset JSON (default: $CREDIT_DATA_PATH)");
    eprintln!("  --period YYYY-MM   Reporting month (default: latest)");
    eprintln!("  --limit N          Ranking size (default: {})", DEFAULT_RANKING_LIMIT);
    eprintln!("  --pretty           Pretty-print JSON");
    std::process::exit(1);
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

/// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date.
fn parse_period(raw: &str) -> Result<NaiveDate> {
    let full = if raw.len() == 7 {
        format!("{raw}-01")
    } else {
        raw.to_string()
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d")
        .with_context(|| format!("invalid period '{raw}', expected YYYY-MM"))
}

fn display_runway(runway: f64) -> f64 {
    if runway.is_infinite() && runway > 0.0 {
        RUNWAY_DISPLAY_CAP
    } else {
        runway
    }
}

/// Caps every runway a company report carries.
fn cap_report_runways(report: &mut CompanyReport) {
    report.metrics.liquidity.runway = display_runway(report.metrics.liquidity.runway);
    if let Some(alert) = report.alert.as_mut() {
        alert.runway = display_runway(alert.runway);
    }
}

fn load_dataset(path: &str) -> Result<Dataset> {
    let file = File::open(path).with_context(|| format!("cannot open dataset {path}"))?;
    let dataset = Dataset::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse dataset {path}"))?;
    tracing::info!(
        path,
        records = dataset.records.len(),
        transactions = dataset.transactions.len(),
        snapshots = dataset.snapshots.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(|s| s.as_str()) else {
        usage();
    };
    let pretty = args.iter().any(|a| a == "--pretty");

    let data_path = match flag_value(&args, "--data") {
        Some(path) => path.to_string(),
        None => std::env::var("CREDIT_DATA_PATH")
            .context("no --data given and CREDIT_DATA_PATH not set")?,
    };
    let config = ScreenerConfig::from_env()?;

    let source = Arc::new(InMemorySource::new(load_dataset(&data_path)?));
    let engine = ScoringEngine::new(Arc::clone(&source));
    let aggregator = PortfolioAggregator::new(engine.clone(), config);

    let period = match flag_value(&args, "--period") {
        Some(raw) => Some(parse_period(raw)?),
        None => aggregator.latest_period(),
    };

    match command {
        "company" => {
            let company_id = args
                .get(1)
                .filter(|a| !a.starts_with("--"))
                .context("company command needs an ID")?;
            let Some(mut report) = engine.company_report(company_id)? else {
                anyhow::bail!("unknown company {company_id}");
            };
            cap_report_runways(&mut report);
            print_json(&report, pretty)?;
        }
        "cohorts" => {
            let period = period.context("dataset has no reporting periods")?;
            let mut cohorts = aggregator.compute_portfolio_cohorts(period);
            for row in cohorts.ideal.iter_mut().chain(cohorts.high_risk.iter_mut()) {
                row.runway = row.runway.map(display_runway);
            }
            tracing::info!(
                period = %period,
                ideal = cohorts.ideal_total,
                high_risk = cohorts.high_risk_total,
                "cohorts ready"
            );
            print_json(&cohorts, pretty)?;
        }
        "stats" => {
            let period = period.context("dataset has no reporting periods")?;
            print_json(&aggregator.period_stats(period), pretty)?;
        }
        "ranking" => {
            let limit = match flag_value(&args, "--limit") {
                Some(raw) => raw.parse().context("--limit must be a number")?,
                None => DEFAULT_RANKING_LIMIT,
            };
            print_json(&aggregator.credit_ranking(limit), pretty)?;
        }
        "sectors" => print_json(&aggregator.sector_summary(), pretty)?,
        "periods" => print_json(&aggregator.periods(), pretty)?,
        _ => usage(),
    }

    Ok(())
}
