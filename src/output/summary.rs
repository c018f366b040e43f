//! Run statistics
//!
//! This module counts the outcomes of a run by class and prints them.

use crate::harvest::FetchFailure;
use crate::model::{IngestOutcome, OutcomeError, RejectReason};

/// Outcome counts for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub validation_failures: usize,
    pub fetch_timeouts: usize,
    pub fetch_network_errors: usize,
    pub fetch_http_status: usize,
    pub store_errors: usize,
    pub task_failures: usize,
    pub cancelled: usize,
}

impl RunSummary {
    /// Counts a slice of outcomes
    pub fn from_outcomes(outcomes: &[IngestOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome {
                IngestOutcome::Accepted(_) => summary.accepted += 1,
                IngestOutcome::Rejected { reason, .. } => match reason {
                    RejectReason::Duplicate => summary.duplicates += 1,
                    RejectReason::Validation(_) => summary.validation_failures += 1,
                },
                IngestOutcome::Errored { error, .. } => match error {
                    OutcomeError::Fetch(FetchFailure::Timeout) => summary.fetch_timeouts += 1,
                    OutcomeError::Fetch(FetchFailure::Network(_)) => {
                        summary.fetch_network_errors += 1
                    }
                    OutcomeError::Fetch(FetchFailure::HttpStatus(_)) => {
                        summary.fetch_http_status += 1
                    }
                    OutcomeError::Store(_) => summary.store_errors += 1,
                    OutcomeError::Task(_) => summary.task_failures += 1,
                },
                IngestOutcome::Cancelled { .. } => summary.cancelled += 1,
            }
        }

        summary
    }

    /// All fetch failures regardless of kind
    pub fn fetch_errors(&self) -> usize {
        self.fetch_timeouts + self.fetch_network_errors + self.fetch_http_status
    }

    /// Every `Errored` outcome
    pub fn errored(&self) -> usize {
        self.fetch_errors() + self.store_errors + self.task_failures
    }

    /// Percentage of candidates that were accepted
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.accepted as f64 / self.total as f64) * 100.0
        }
    }
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The counts to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Candidates: {}", summary.total);
    println!("  Accepted: {}", summary.accepted);
    println!("  Success rate: {:.1}%", summary.success_rate());
    println!();

    println!("Not accepted:");
    let rows = [
        ("duplicate", summary.duplicates),
        ("validation-failure", summary.validation_failures),
        ("fetch-timeout", summary.fetch_timeouts),
        ("fetch-network-error", summary.fetch_network_errors),
        ("fetch-http-status", summary.fetch_http_status),
        ("store-error", summary.store_errors),
        ("task-failed", summary.task_failures),
        ("cancelled", summary.cancelled),
    ];
    let mut shown = 0;
    for (tag, count) in rows {
        if count > 0 {
            println!("  {}: {}", tag, count);
            shown += 1;
        }
    }
    if shown == 0 {
        println!("  (none)");
    }
    println!();
}
