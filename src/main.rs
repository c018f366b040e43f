//! Prospect-Harvest main entry point
//!
//! This is the command-line interface for the Prospect-Harvest company data pipeline.

use anyhow::Context;
use clap::Parser;
use prospect_harvest::config::{load_config_with_hash, Config};
use prospect_harvest::harvest::{Coordinator, LogSink};
use prospect_harvest::output::{print_summary, write_run_report};
use prospect_harvest::source::{CandidateSource, StaticSource};
use prospect_harvest::storage::{open_store, CompanyStore, MemoryStore, RunStatus, SqliteStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Prospect-Harvest: company data acquisition
///
/// Prospect-Harvest fetches candidate company pages under a global rate
/// limit, extracts company details, normalizes addresses and stores new,
/// deduplicated records.
#[derive(Parser, Debug)]
#[command(name = "prospect-harvest")]
#[command(version)]
#[command(about = "Concurrent company data acquisition", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Harvest only the targets for this keyword (repeatable; default: all)
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Extra candidate URL to harvest (repeatable)
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long)]
    dry_run: bool,

    /// Keep records in memory only; no database is opened or written
    #[arg(long)]
    memory: bool,

    /// Write the markdown report here instead of the configured path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let candidates = collect_candidates(&config, &cli).await?;

    if cli.dry_run {
        handle_dry_run(&config, &candidates);
        return Ok(());
    }

    handle_harvest(config, &config_hash, candidates, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("prospect_harvest=info,warn"),
            1 => EnvFilter::new("prospect_harvest=debug,info"),
            2 => EnvFilter::new("prospect_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Resolves keywords to URLs and appends ad-hoc URLs
async fn collect_candidates(config: &Config, cli: &Cli) -> anyhow::Result<Vec<String>> {
    let source = StaticSource::new(config.targets.clone());
    let keywords = if cli.keywords.is_empty() {
        source.keywords()
    } else {
        cli.keywords.clone()
    };

    let mut candidates = Vec::new();
    for keyword in &keywords {
        let urls = source.search(keyword).await?;
        if urls.is_empty() {
            tracing::warn!("No targets configured for keyword '{}'", keyword);
        }
        candidates.extend(urls);
    }
    candidates.extend(cli.urls.iter().cloned());

    Ok(candidates)
}

/// Handles the --dry-run mode: shows the configuration and candidate list
fn handle_dry_run(config: &Config, candidates: &[String]) {
    println!("=== Prospect-Harvest Dry Run ===\n");

    println!("Fetcher:");
    println!(
        "  Requests per second: {}",
        config.fetcher.requests_per_second
    );
    println!("  Timeout: {}s", config.fetcher.timeout_seconds);
    println!("  User agents: {}", config.fetcher.user_agents.len());
    println!(
        "  Retries: {} (backoff {}ms)",
        config.fetcher.max_retries, config.fetcher.retry_backoff_ms
    );

    println!("\nPipeline:");
    println!("  Max concurrency: {}", config.pipeline.max_concurrency);
    println!(
        "  Canonical dedup keys: {}",
        config.pipeline.canonicalize_urls
    );

    println!("\nExtractor:");
    println!(
        "  Info block keywords: {}",
        config.extractor.info_block_keywords.join(", ")
    );
    println!("  Label rules: {}", config.extractor.labels.len());

    println!("\nAddress:");
    println!("  Regions: {}", config.address.regions.len());
    println!(
        "  Locality suffixes: {}",
        config.address.locality_suffixes.join(" ")
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);

    println!("\nCandidates ({}):", candidates.len());
    for url in candidates {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles a harvest run
async fn handle_harvest(
    config: Config,
    config_hash: &str,
    candidates: Vec<String>,
    cli: &Cli,
) -> anyhow::Result<()> {
    let report_path = cli
        .report
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.report_path));

    let (store, database): (Arc<dyn CompanyStore>, Option<Arc<SqliteStore>>) = if cli.memory {
        tracing::info!("Using in-memory store");
        let store: Arc<dyn CompanyStore> = Arc::new(MemoryStore::new());
        (store, None)
    } else {
        let path = Path::new(&config.output.database_path);
        let database = Arc::new(
            open_store(path).with_context(|| format!("failed to open {}", path.display()))?,
        );
        let store: Arc<dyn CompanyStore> = database.clone();
        (store, Some(database))
    };

    let coordinator = Coordinator::new(config, store)?;

    let run_id = match &database {
        Some(db) => Some(db.create_run(config_hash)?),
        None => None,
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing in-flight fetches");
            signal_token.cancel();
        }
    });

    let result = coordinator
        .run_configured(&candidates, &LogSink, cancel)
        .await;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            if let (Some(db), Some(run_id)) = (&database, run_id) {
                db.complete_run(run_id, RunStatus::Failed, &Default::default())?;
            }
            return Err(e.into());
        }
    };

    let summary = result.summary();
    if let (Some(db), Some(run_id)) = (&database, run_id) {
        let status = if result.was_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        db.complete_run(run_id, status, &summary)?;
    }

    print_summary(&summary);

    write_run_report(&result, config_hash, &report_path)
        .with_context(|| format!("failed to write {}", report_path.display()))?;
    println!("✓ Report written to: {}", report_path.display());

    Ok(())
}
