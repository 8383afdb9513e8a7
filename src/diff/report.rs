//! Table (ANSI-colored) and JSON output for report diffs.
//!
//! Green for improvements, red for regressions, yellow for no change.

use serde::Serialize;

use super::{DiffEntry, DiffStatus, DiffSummary};
use crate::report_helpers;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const ID_WIDTH: usize = 40;

/// Signed delta in percentage points, colored by status.
fn colored_delta(entry: &DiffEntry) -> String {
    let Some(delta) = entry.delta else {
        return format!("{:>7}", "-");
    };
    let points = delta * 100.0;
    match entry.status {
        DiffStatus::Improved => format!("{GREEN}{points:>+7.1}{RESET}"),
        DiffStatus::Regressed => format!("{RED}{points:>+7.1}{RESET}"),
        _ => format!("{YELLOW}{:>7}{RESET}", "0.0"),
    }
}

fn colored_status(status: DiffStatus) -> String {
    match status {
        DiffStatus::Improved => format!("{GREEN}{}{RESET}", status.as_str()),
        DiffStatus::Regressed => format!("{RED}{}{RESET}", status.as_str()),
        DiffStatus::Added | DiffStatus::Removed => format!("{BOLD}{}{RESET}", status.as_str()),
        DiffStatus::Unchanged => status.as_str().to_string(),
    }
}

/// Print the diff as a formatted table with ANSI colors.
pub fn print_report(entries: &[DiffEntry], reference: &str, changed_only: bool) {
    let separator = report_helpers::separator(80);
    let summary = DiffSummary::of(entries);

    println!("Score Diff vs {BOLD}{reference}{RESET}");
    println!("{separator}");

    if let Some(total) = entries.iter().find(|e| e.id.is_empty()) {
        println!(
            " Overall Score: {} → {}  ({})",
            report_helpers::format_percent(total.reference),
            report_helpers::format_percent(total.current),
            colored_delta(total).trim_start(),
        );
    }
    println!(
        " Improved: {}  Regressed: {}  Added: {}  Removed: {}  Unchanged: {}",
        summary.improved, summary.regressed, summary.added, summary.removed, summary.unchanged,
    );

    println!("{separator}");
    println!(
        " {} {:>9} {:>9} {:>7}   Status",
        report_helpers::fit_width("Identifier", ID_WIDTH),
        "Before",
        "After",
        "Delta",
    );
    println!("{separator}");

    for e in entries
        .iter()
        .filter(|e| !changed_only || e.status != DiffStatus::Unchanged)
    {
        println!(
            " {} {:>9} {:>9} {}   {}",
            report_helpers::fit_width(report_helpers::display_id(&e.id), ID_WIDTH),
            report_helpers::format_percent(e.reference),
            report_helpers::format_percent(e.current),
            colored_delta(e),
            colored_status(e.status),
        );
    }

    println!("{separator}");
}

// --- JSON output ---

#[derive(Serialize)]
struct JsonTotal {
    before: Option<f64>,
    after: Option<f64>,
    delta: Option<f64>,
}

#[derive(Serialize)]
struct JsonDiff<'a> {
    current: &'a str,
    reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<JsonTotal>,
    summary: DiffSummary,
    entries: Vec<&'a DiffEntry>,
}

/// Serialize the diff to pretty-printed JSON and print to stdout.
pub fn print_json(
    entries: &[DiffEntry],
    current: &str,
    reference: &str,
    changed_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = JsonDiff {
        current,
        reference,
        total: entries.iter().find(|e| e.id.is_empty()).map(|t| JsonTotal {
            before: t.reference,
            after: t.current,
            delta: t.delta,
        }),
        summary: DiffSummary::of(entries),
        entries: entries
            .iter()
            .filter(|e| !changed_only || e.status != DiffStatus::Unchanged)
            .collect(),
    };
    report_helpers::print_json_stdout(&json)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
