//! Report scoring: leaf normalization and weighted aggregation.

mod aggregate;
mod normalize;
mod report;

use std::error::Error;

use crate::config::Settings;
use crate::facade::ReportData;
use crate::source;

pub use aggregate::{
    DEFAULT_WEIGHT, NodeScore, ScoreSummary, ScoredNode, ScoredTree, aggregate, weighted_mean,
};
pub use normalize::normalize_metric;
use report::{print_json, print_report};

pub fn run(
    settings: &Settings,
    report: &str,
    reference: Option<&str>,
    json: bool,
    depth: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let mut data = ReportData::new(settings.clone());
    data.load_report(source::open(report, &settings.fetch).as_ref())?;
    if let Some(reference) = reference {
        data.load_reference(source::open(reference, &settings.fetch).as_ref())?;
    }

    let snapshot = data.snapshot().ok_or("no report loaded")?;
    let view = report::ReportView {
        scored: snapshot.scored(),
        diff: data.get_diff(),
        target: report,
        reference,
        depth,
    };
    if json {
        print_json(&view)?;
    } else {
        print_report(&view);
    }
    Ok(())
}
