use crate::harvest::FetchFailure;
use crate::model::record::CompanyRecord;
use crate::output::RunSummary;
use chrono::{DateTime, Utc};
use std::fmt;

/// Why a candidate was turned away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// A record with the same dedup key already exists
    Duplicate,
    /// A required field is missing or malformed
    Validation(String),
}

/// Why a candidate could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    Fetch(FetchFailure),
    /// The dedup/persistence collaborator failed for this URL
    Store(String),
    /// The task processing this URL panicked or was aborted
    Task(String),
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeError::Fetch(failure) => write!(f, "{}", failure),
            OutcomeError::Store(message) => write!(f, "store error: {}", message),
            OutcomeError::Task(message) => write!(f, "task failed: {}", message),
        }
    }
}

/// Terminal classification of one candidate URL
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Accepted(CompanyRecord),
    Rejected { url: String, reason: RejectReason },
    Errored { url: String, error: OutcomeError },
    /// The run was cancelled before this URL's fetch began
    Cancelled { url: String },
}

impl IngestOutcome {
    /// The candidate URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            IngestOutcome::Accepted(record) => &record.url,
            IngestOutcome::Rejected { url, .. }
            | IngestOutcome::Errored { url, .. }
            | IngestOutcome::Cancelled { url } => url,
        }
    }

    /// Stable kebab-case tag for reports and logs
    pub fn tag(&self) -> &'static str {
        match self {
            IngestOutcome::Accepted(_) => "accepted",
            IngestOutcome::Rejected {
                reason: RejectReason::Duplicate,
                ..
            } => "duplicate",
            IngestOutcome::Rejected {
                reason: RejectReason::Validation(_),
                ..
            } => "validation-failure",
            IngestOutcome::Errored {
                error: OutcomeError::Fetch(failure),
                ..
            } => failure.tag(),
            IngestOutcome::Errored {
                error: OutcomeError::Store(_),
                ..
            } => "store-error",
            IngestOutcome::Errored {
                error: OutcomeError::Task(_),
                ..
            } => "task-failed",
            IngestOutcome::Cancelled { .. } => "cancelled",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            IngestOutcome::Rejected {
                reason: RejectReason::Duplicate,
                ..
            }
        )
    }

    /// The accepted record, if any
    pub fn record(&self) -> Option<&CompanyRecord> {
        match self {
            IngestOutcome::Accepted(record) => Some(record),
            _ => None,
        }
    }

    /// Human-readable detail for non-accepted outcomes
    pub fn detail(&self) -> Option<String> {
        match self {
            IngestOutcome::Accepted(_) => None,
            IngestOutcome::Rejected { reason, .. } => match reason {
                RejectReason::Duplicate => Some("already ingested".to_string()),
                RejectReason::Validation(message) => Some(message.clone()),
            },
            IngestOutcome::Errored { error, .. } => Some(error.to_string()),
            IngestOutcome::Cancelled { .. } => Some("run cancelled before fetch".to_string()),
        }
    }
}

/// Point-in-time progress of a run, emitted after every finished task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub current_url: Option<String>,
}

impl ProgressSnapshot {
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Terminal result of one pipeline run
///
/// `outcomes` is index-aligned with the URLs the run was given.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcomes: Vec<IngestOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    /// An empty run, used when a candidate source yields nothing
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            outcomes: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Accepted records in input order
    pub fn accepted(&self) -> impl Iterator<Item = &CompanyRecord> {
        self.outcomes.iter().filter_map(IngestOutcome::record)
    }

    /// Outcome counts per class
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    /// Returns true if any outcome is `Cancelled`
    pub fn was_cancelled(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, IngestOutcome::Cancelled { .. }))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
