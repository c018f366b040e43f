//! Output module for run summaries and reports
//!
//! This module handles:
//! - Counting outcomes per class for a finished run
//! - Printing a summary to the terminal
//! - Generating markdown reports of run results

mod markdown;
mod summary;

pub use markdown::{format_run_report, write_run_report};
pub use summary::{print_summary, RunSummary};
