use serde::Serialize;

use super::{DisplayField, HistorySeries, SeriesPoint};
use crate::report_helpers;

const COMMIT_WIDTH: usize = 12;
const BRANCH_WIDTH: usize = 20;

/// Print a history series as one row per run.
pub fn print_report(series: &HistorySeries, target: Option<&str>) {
    let separator = report_helpers::separator(60);

    let id = report_helpers::display_id(&series.id);
    match target {
        Some(t) => println!("History: {id} ({t})"),
        None => println!("History: {id}"),
    }
    println!("{separator}");

    if series.is_empty() {
        println!(" No history recorded.");
        println!("{separator}");
        return;
    }

    let label = match series.display_field {
        DisplayField::Metric => "Score",
        DisplayField::Data => "Value",
    };
    println!(
        " {} {} {:>10}   Time",
        report_helpers::fit_width("Commit", COMMIT_WIDTH),
        report_helpers::fit_width("Branch", BRANCH_WIDTH),
        label,
    );
    println!("{separator}");

    for p in &series.points {
        let time = p
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            " {} {} {:>10}   {time}",
            report_helpers::fit_width(&p.commit, COMMIT_WIDTH),
            report_helpers::fit_width(&p.branch, BRANCH_WIDTH),
            format_value(p, series.display_field),
        );
    }

    println!("{separator}");
    println!(
        " {} runs on {} branches",
        series.points.len(),
        series.branches().len()
    );
}

fn format_value(p: &SeriesPoint, field: DisplayField) -> String {
    match (p.value, field) {
        (None, _) => "-".to_string(),
        (Some(_), DisplayField::Metric) => report_helpers::format_percent(p.value),
        (Some(v), DisplayField::Data) => format!("{v:.4}"),
    }
}

#[derive(Serialize)]
struct JsonHistory<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
    #[serde(flatten)]
    series: &'a HistorySeries,
    branches: Vec<&'a str>,
}

/// Serialize the series to pretty-printed JSON and print to stdout.
pub fn print_json(
    series: &HistorySeries,
    target: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = JsonHistory {
        target,
        series,
        branches: series.branches(),
    };
    report_helpers::print_json_stdout(&json)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
