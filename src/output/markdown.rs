//! Markdown run report generation
//!
//! This module generates human-readable markdown reports of a run: counts,
//! the accepted companies, and every candidate that was not accepted.

use crate::model::RunResult;
use crate::output::summary::RunSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report for a finished run
///
/// # Arguments
///
/// * `result` - The run's outcomes
/// * `config_hash` - Hash of the configuration that produced the run
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(io::Error)` - Failed to write the report
pub fn write_run_report(
    result: &RunResult,
    config_hash: &str,
    output_path: &Path,
) -> std::io::Result<()> {
    let markdown = format_run_report(result, config_hash);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run as markdown
pub fn format_run_report(result: &RunResult, config_hash: &str) -> String {
    let summary = RunSummary::from_outcomes(&result.outcomes);
    let mut md = String::new();

    md.push_str("# Prospect-Harvest Run Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", result.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", result.finished_at.to_rfc3339()));
    let duration = result.finished_at - result.started_at;
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        duration.num_milliseconds() as f64 / 1000.0
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    md.push_str("## Outcome Breakdown\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Accepted | {} |\n", summary.accepted));
    md.push_str(&format!("| Duplicate | {} |\n", summary.duplicates));
    md.push_str(&format!(
        "| Validation failure | {} |\n",
        summary.validation_failures
    ));
    md.push_str(&format!("| Fetch timeout | {} |\n", summary.fetch_timeouts));
    md.push_str(&format!(
        "| Fetch network error | {} |\n",
        summary.fetch_network_errors
    ));
    md.push_str(&format!(
        "| Fetch HTTP status | {} |\n",
        summary.fetch_http_status
    ));
    md.push_str(&format!("| Store error | {} |\n", summary.store_errors));
    md.push_str(&format!("| Task failed | {} |\n", summary.task_failures));
    md.push_str(&format!("| Cancelled | {} |\n", summary.cancelled));
    md.push_str(&format!("| **Total** | {} |\n\n", summary.total));
    md.push_str(&format!(
        "Success rate: {:.2}%\n\n",
        summary.success_rate()
    ));

    md.push_str("## Accepted Companies\n\n");
    if summary.accepted == 0 {
        md.push_str("_None._\n\n");
    } else {
        md.push_str("| Company | Region | Locality | Tel | URL |\n");
        md.push_str("|---------|--------|----------|-----|-----|\n");
        for record in result.accepted() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&record.company_name),
                escape_cell(&record.region),
                escape_cell(&record.locality),
                escape_cell(&record.tel),
                escape_cell(&record.url)
            ));
        }
        md.push('\n');
    }

    let rejected: Vec<_> = result
        .outcomes
        .iter()
        .filter(|outcome| !outcome.is_accepted())
        .collect();
    if !rejected.is_empty() {
        md.push_str("## Not Accepted\n\n");
        md.push_str("| URL | Outcome | Detail |\n");
        md.push_str("|-----|---------|--------|\n");
        for outcome in rejected {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(outcome.url()),
                outcome.tag(),
                escape_cell(&outcome.detail().unwrap_or_default())
            ));
        }
        md.push('\n');
    }

    md
}

/// Keeps table cells on one line and stops `|` from splitting them
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
