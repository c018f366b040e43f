//! Data model for the acquisition pipeline
//!
//! Values flow one way through a run:
//! candidate URL → fetch result → [`ExtractedFields`] → [`NormalizedAddress`]
//! → [`CompanyRecord`] → [`IngestOutcome`].

mod fields;
mod outcome;
mod record;

pub use fields::{ExtractedFields, Field};
pub use outcome::{IngestOutcome, OutcomeError, ProgressSnapshot, RejectReason, RunResult};
pub use record::{CompanyRecord, NormalizedAddress};
