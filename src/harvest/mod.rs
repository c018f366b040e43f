//! The acquisition pipeline
//!
//! This module contains the core pipeline logic, including:
//! - Global rate limiting of outbound requests
//! - HTTP fetching with user agent rotation and optional retry
//! - Heuristic field extraction from markup
//! - Deduplication against the store
//! - Overall run coordination and progress reporting

mod coordinator;
mod dedup;
mod extractor;
mod fetcher;
mod progress;
mod rate_limiter;

pub use coordinator::Coordinator;
pub use dedup::Deduplicator;
pub use extractor::Extractor;
pub use fetcher::{
    build_http_client, FetchFailure, FetchResult, Fetcher, RetryPolicy, UserAgentPool,
    MAX_REDIRECTS,
};
pub use progress::{ChannelSink, LogSink, ProgressSink};
pub use rate_limiter::RateLimiter;
