//! Pipeline coordinator
//!
//! The coordinator drives one run end to end:
//! 1. Validate the run arguments
//! 2. Spawn one task per candidate URL, gated by a semaphore
//! 3. In each task: fetch, extract, check the store, validate, claim, normalize, store
//! 4. Collect outcomes in input order while reporting progress in completion order

use crate::address::AddressNormalizer;
use crate::config::{validate, validate_max_concurrency, Config};
use crate::harvest::dedup::Deduplicator;
use crate::harvest::extractor::Extractor;
use crate::harvest::fetcher::{
    build_http_client, FetchResult, Fetcher, RetryPolicy, UserAgentPool,
};
use crate::harvest::progress::ProgressSink;
use crate::harvest::rate_limiter::RateLimiter;
use crate::model::{
    CompanyRecord, Field, IngestOutcome, OutcomeError, ProgressSnapshot, RejectReason, RunResult,
};
use crate::source::CandidateSource;
use crate::storage::CompanyStore;
use crate::url::validate_url;
use crate::ConfigError;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs candidate URLs through the acquisition pipeline
///
/// A coordinator holds a validated configuration and the shared collaborators.
/// Every call to [`Coordinator::run`] gets a fresh rate limiter and claim set,
/// so runs do not leak state into each other.
pub struct Coordinator {
    config: Config,
    store: Arc<dyn CompanyStore>,
    client: Client,
    agents: Arc<UserAgentPool>,
    extractor: Arc<Extractor>,
    normalizer: Arc<AddressNormalizer>,
}

impl Coordinator {
    /// Creates a coordinator with an OS-seeded user agent pool
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Config` if the configuration is invalid.
    pub fn new(config: Config, store: Arc<dyn CompanyStore>) -> crate::Result<Self> {
        validate(&config)?;
        let agents = UserAgentPool::new(config.fetcher.user_agents.clone())
            .ok_or_else(|| ConfigError::Validation("user_agents must not be empty".to_string()))?;
        Self::with_agents(config, store, agents)
    }

    /// Creates a coordinator with an explicit user agent pool
    ///
    /// Pass a pool built with [`UserAgentPool::with_rng`] for a reproducible
    /// agent sequence.
    pub fn with_agents(
        config: Config,
        store: Arc<dyn CompanyStore>,
        agents: UserAgentPool,
    ) -> crate::Result<Self> {
        validate(&config)?;
        let client = build_http_client(Duration::from_secs(config.fetcher.timeout_seconds))?;

        Ok(Self {
            extractor: Arc::new(Extractor::new(&config.extractor)),
            normalizer: Arc::new(AddressNormalizer::new(&config.address)),
            agents: Arc::new(agents),
            client,
            store,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a batch with the configured concurrency
    pub async fn run_configured(
        &self,
        urls: &[String],
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> crate::Result<RunResult> {
        self.run(urls, self.config.pipeline.max_concurrency, sink, cancel)
            .await
    }

    /// Asks a candidate source for URLs and runs them
    ///
    /// A keyword with no candidates yields an empty result, not an error.
    pub async fn harvest(
        &self,
        source: &dyn CandidateSource,
        keyword: &str,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> crate::Result<RunResult> {
        let urls = source.search(keyword).await?;

        if urls.is_empty() {
            tracing::info!("No candidates found for keyword '{}'", keyword);
            return Ok(RunResult::empty());
        }

        tracing::info!("Keyword '{}' gave {} candidate(s)", keyword, urls.len());
        self.run_configured(&urls, sink, cancel).await
    }

    /// Runs a batch of candidate URLs
    ///
    /// # Arguments
    ///
    /// * `urls` - Candidate URLs, processed in any order
    /// * `max_concurrency` - Maximum number of tasks in flight (1..=100)
    /// * `sink` - Called once per finished task, in completion order
    /// * `cancel` - URLs whose request has not been sent when this fires end `Cancelled`
    ///
    /// # Returns
    ///
    /// * `Ok(RunResult)` - One outcome per URL, index-aligned with `urls`
    /// * `Err(HarvestError)` - The run arguments were invalid; nothing was fetched
    pub async fn run(
        &self,
        urls: &[String],
        max_concurrency: usize,
        sink: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> crate::Result<RunResult> {
        validate_max_concurrency(max_concurrency)?;

        let started_at = Utc::now();
        let total = urls.len();
        tracing::info!(
            "Starting run: {} candidate(s), concurrency {}",
            total,
            max_concurrency
        );

        let context = Arc::new(self.run_context(cancel)?);
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let context = Arc::clone(&context);
            let semaphore = Arc::clone(&semaphore);
            let url = url.clone();

            tasks.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = context.cancel.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };

                let outcome = match permit {
                    Some(_permit) => context.process(&url).await,
                    None => cancelled(&url),
                };
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<IngestOutcome>> = vec![None; total];
        let mut processed = 0;

        while let Some(joined) = tasks.join_next().await {
            processed += 1;

            let current_url = match joined {
                Ok((index, outcome)) => {
                    let url = outcome.url().to_string();
                    outcomes[index] = Some(outcome);
                    Some(url)
                }
                Err(e) => {
                    tracing::error!("Pipeline task failed: {}", e);
                    None
                }
            };

            sink.on_progress(&ProgressSnapshot {
                processed,
                total,
                current_url,
            });
        }

        let outcomes: Vec<IngestOutcome> = outcomes
            .into_iter()
            .zip(urls)
            .map(|(outcome, url)| {
                outcome.unwrap_or_else(|| IngestOutcome::Errored {
                    url: url.clone(),
                    error: OutcomeError::Task("no outcome produced".to_string()),
                })
            })
            .collect();

        let result = RunResult {
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };

        let summary = result.summary();
        tracing::info!(
            "Run finished: {} accepted, {} duplicate(s), {} rejected, {} errored, {} cancelled (of {})",
            summary.accepted,
            summary.duplicates,
            summary.validation_failures,
            summary.errored(),
            summary.cancelled,
            summary.total
        );

        Ok(result)
    }

    fn run_context(&self, cancel: CancellationToken) -> crate::Result<RunContext> {
        let limiter = RateLimiter::new(self.config.fetcher.requests_per_second)?;
        let fetcher = Fetcher::new(
            self.client.clone(),
            Arc::new(limiter),
            Arc::clone(&self.agents),
            RetryPolicy::from_config(&self.config.fetcher),
        );

        Ok(RunContext {
            fetcher,
            extractor: Arc::clone(&self.extractor),
            normalizer: Arc::clone(&self.normalizer),
            dedup: Deduplicator::new(
                Arc::clone(&self.store),
                self.config.pipeline.canonicalize_urls,
            ),
            cancel,
        })
    }
}

/// State shared by the tasks of one run
struct RunContext {
    fetcher: Fetcher,
    extractor: Arc<Extractor>,
    normalizer: Arc<AddressNormalizer>,
    dedup: Deduplicator,
    cancel: CancellationToken,
}

impl RunContext {
    /// Takes one candidate from fetch to a terminal outcome
    ///
    /// Cancellation is honored until the request is sent: while queued in the
    /// rate limiter and between retry attempts.
    async fn process(&self, url: &str) -> IngestOutcome {
        if self.cancel.is_cancelled() {
            return cancelled(url);
        }

        if let Err(e) = validate_url(url) {
            tracing::debug!("Rejecting {}: {}", url, e);
            return reject(url, format!("invalid candidate URL: {}", e));
        }

        let (final_url, body) = match self.fetcher.fetch_with_retry(url, &self.cancel).await {
            None => {
                tracing::debug!("Cancelled before fetching {}", url);
                return cancelled(url);
            }
            Some(FetchResult::Page {
                final_url, body, ..
            }) => (final_url, body),
            Some(FetchResult::Failed { failure, .. }) => {
                tracing::warn!("Fetch failed for {}: {}", url, failure);
                return IngestOutcome::Errored {
                    url: url.to_string(),
                    error: OutcomeError::Fetch(failure),
                };
            }
        };

        let fields = self.extractor.extract(&body, &final_url);

        // A stored URL stays a duplicate whatever its page looks like now
        match self.dedup.is_duplicate(url) {
            Ok(false) => {}
            Ok(true) => {
                tracing::debug!("Already stored: {}", url);
                return duplicate(url);
            }
            Err(e) => {
                tracing::warn!("Dedup lookup failed for {}: {}", url, e);
                return store_error(url, e.to_string());
            }
        }

        if !fields.is_filled(Field::CompanyName) {
            tracing::debug!("No company name on {} ({:?})", url, fields.notes());
            return reject(url, "company name not found".to_string());
        }

        match self.dedup.claim(url) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Duplicate candidate {}", url);
                return duplicate(url);
            }
            Err(e) => {
                tracing::warn!("Dedup lookup failed for {}: {}", url, e);
                return store_error(url, e.to_string());
            }
        }

        let address = self.normalizer.normalize(fields.get(Field::Address));
        let record = CompanyRecord::new(
            url,
            &self.dedup.key(url),
            &final_url,
            &fields,
            address,
            Utc::now(),
        );

        match self.dedup.store().insert(&record) {
            Ok(true) => {
                tracing::info!("Accepted {} ({})", record.company_name, url);
                IngestOutcome::Accepted(record)
            }
            Ok(false) => {
                tracing::debug!("Store already held {}", url);
                duplicate(url)
            }
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", url, e);
                self.dedup.release(url);
                store_error(url, e.to_string())
            }
        }
    }
}

fn reject(url: &str, message: String) -> IngestOutcome {
    IngestOutcome::Rejected {
        url: url.to_string(),
        reason: RejectReason::Validation(message),
    }
}

fn cancelled(url: &str) -> IngestOutcome {
    IngestOutcome::Cancelled {
        url: url.to_string(),
    }
}

fn duplicate(url: &str) -> IngestOutcome {
    IngestOutcome::Rejected {
        url: url.to_string(),
        reason: RejectReason::Duplicate,
    }
}

fn store_error(url: &str, message: String) -> IngestOutcome {
    IngestOutcome::Errored {
        url: url.to_string(),
        error: OutcomeError::Store(message),
    }
}
