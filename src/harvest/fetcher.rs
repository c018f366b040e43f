//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the shared HTTP client (timeout, redirects, compression)
//! - Rotating user agents drawn from an injectable random source
//! - Passing every request through the global rate limiter
//! - Classifying failures into timeouts, network errors and HTTP statuses
//! - Optional bounded retry for transient failures, abandoned on cancellation

use crate::config::FetcherConfig;
use crate::harvest::rate_limiter::RateLimiter;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use reqwest::header::USER_AGENT;
use reqwest::{redirect::Policy, Client};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Maximum number of redirect hops followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Why a fetch produced no usable page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

impl FetchFailure {
    /// Stable outcome tag for this failure kind
    pub fn tag(&self) -> &'static str {
        match self {
            FetchFailure::Timeout => "fetch-timeout",
            FetchFailure::Network(_) => "fetch-network-error",
            FetchFailure::HttpStatus(_) => "fetch-http-status",
        }
    }

    /// Returns true for failures worth another attempt
    ///
    /// | Failure | Retried |
    /// |---------|---------|
    /// | Timeout | yes |
    /// | Network error | yes |
    /// | HTTP 429 | yes |
    /// | HTTP 5xx | yes |
    /// | Other HTTP status | no |
    pub fn is_transient(&self) -> bool {
        match self {
            FetchFailure::Timeout | FetchFailure::Network(_) => true,
            FetchFailure::HttpStatus(code) => *code == 429 || *code >= 500,
        }
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// The page was retrieved with a 2xx status
    Page {
        /// The URL that was requested
        url: String,
        /// Final URL after redirects
        final_url: String,
        status_code: u16,
        body: String,
    },

    /// The page could not be retrieved
    Failed { url: String, failure: FetchFailure },
}

impl FetchResult {
    /// The URL that was requested
    pub fn url(&self) -> &str {
        match self {
            FetchResult::Page { url, .. } | FetchResult::Failed { url, .. } => url,
        }
    }

    pub fn is_page(&self) -> bool {
        matches!(self, FetchResult::Page { .. })
    }

    /// The failure, if the fetch failed
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchResult::Page { .. } => None,
            FetchResult::Failed { failure, .. } => Some(failure),
        }
    }
}

/// Pool of user agent strings with a pluggable random source
pub struct UserAgentPool {
    agents: Vec<String>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl UserAgentPool {
    /// Creates a pool seeded from the operating system
    ///
    /// Returns `None` if `agents` is empty.
    pub fn new(agents: Vec<String>) -> Option<Self> {
        Self::with_rng(agents, StdRng::from_os_rng())
    }

    /// Creates a pool drawing from the given random source
    ///
    /// Tests pass a seeded RNG to make the selection sequence reproducible.
    pub fn with_rng<R>(agents: Vec<String>, rng: R) -> Option<Self>
    where
        R: RngCore + Send + 'static,
    {
        if agents.is_empty() {
            return None;
        }

        Some(Self {
            agents,
            rng: Mutex::new(Box::new(rng)),
        })
    }

    /// Picks one agent uniformly at random
    pub fn pick(&self) -> &str {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.random_range(0..self.agents.len())
        };
        &self.agents[index]
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

impl std::fmt::Debug for UserAgentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAgentPool")
            .field("agents", &self.agents)
            .finish_non_exhaustive()
    }
}

/// How many times, and how patiently, transient failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `backoff * n`
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Builds the HTTP client shared by every fetch of a run
///
/// # Arguments
///
/// * `timeout` - Whole-request timeout, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// The user agent is set per request, so the client carries none.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page fetcher
///
/// Never returns an error: every problem is folded into
/// [`FetchResult::Failed`].
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    agents: Arc<UserAgentPool>,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(
        client: Client,
        limiter: Arc<RateLimiter>,
        agents: Arc<UserAgentPool>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            limiter,
            agents,
            retry,
        }
    }

    /// Builds a fetcher (client, limiter, agent pool) from configuration
    ///
    /// # Errors
    ///
    /// Fails on an invalid rate, an empty agent list, or a client that cannot
    /// be constructed.
    pub fn from_config(config: &FetcherConfig) -> crate::Result<Self> {
        let limiter = RateLimiter::new(config.requests_per_second)?;
        let agents = UserAgentPool::new(config.user_agents.clone()).ok_or_else(|| {
            crate::ConfigError::Validation("user_agents must not be empty".to_string())
        })?;
        let client = build_http_client(Duration::from_secs(config.timeout_seconds))?;

        Ok(Self::new(
            client,
            Arc::new(limiter),
            Arc::new(agents),
            RetryPolicy::from_config(config),
        ))
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetches one URL, exactly once
    ///
    /// # Request Flow
    ///
    /// 1. Wait for the rate limiter
    /// 2. Pick a user agent
    /// 3. Send GET, following up to 10 redirects
    /// 4. Classify the response
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.limiter.wait().await;
        self.send(url).await
    }

    /// Sends the request for an already admitted fetch
    async fn send(&self, url: &str) -> FetchResult {
        let agent = self.agents.pick();
        tracing::debug!("Fetching {} (agent: {})", url, agent);

        let response = match self.client.get(url).header(USER_AGENT, agent).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchResult::Failed {
                    url: url.to_string(),
                    failure: classify_error(&e),
                }
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return FetchResult::Failed {
                url: url.to_string(),
                failure: FetchFailure::HttpStatus(status.as_u16()),
            };
        }

        match response.text().await {
            Ok(body) => FetchResult::Page {
                url: url.to_string(),
                final_url,
                status_code: status.as_u16(),
                body,
            },
            Err(e) => FetchResult::Failed {
                url: url.to_string(),
                failure: classify_error(&e),
            },
        }
    }

    /// Fetches one URL, retrying transient failures per the retry policy
    ///
    /// Every attempt waits for the rate limiter again. With `max_retries = 0`
    /// a single request is sent.
    ///
    /// # Returns
    ///
    /// * `Some(FetchResult)` - The last attempt's result
    /// * `None` - `cancel` fired while waiting for admission or for a retry;
    ///   no further request was sent
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Option<FetchResult> {
        let mut attempt = 0;

        loop {
            self.limiter.wait_unless_cancelled(cancel).await?;
            if cancel.is_cancelled() {
                return None;
            }

            let result = self.send(url).await;

            let failure = match result.failure() {
                Some(failure) if failure.is_transient() && attempt < self.retry.max_retries => {
                    failure.clone()
                }
                _ => return Some(result),
            };

            attempt += 1;
            let delay = self.retry.delay_for(attempt);
            tracing::debug!(
                "Retrying {} after {} (attempt {}/{}, waiting {:?})",
                url,
                failure,
                attempt,
                self.retry.max_retries,
                delay
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Retry of {} abandoned: run cancelled", url);
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Network(format!("connection failed: {}", error))
    } else if error.is_redirect() {
        FetchFailure::Network(format!("redirect error: {}", error))
    } else {
        FetchFailure::Network(error.to_string())
    }
}
