//! Per-test history series for trend display.
//!
//! Raw history points carry both a `data` value and a `metric` in [0, 1].
//! Scored tests are shown by metric, inverted so that a rising line means
//! a better score; everything else shows its data value as recorded.

mod report;

use std::error::Error;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::warn;

use crate::config::Settings;
use crate::facade::ReportData;
use crate::source;

pub use report::{print_json, print_report};

/// History key holding the overall report score per commit.
pub const TOTAL_KEY: &str = "total";

/// One recorded run of a test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub commit: String,
    pub branch: String,
    pub data: Option<f64>,
    pub metric: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<FixedOffset>>,
}

/// Which raw field a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayField {
    Data,
    Metric,
}

impl DisplayField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Metric => "metric",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub commit: String,
    pub branch: String,
    /// `None` when the run did not record the displayed field.
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<FixedOffset>>,
}

/// Display-ready history of one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySeries {
    pub id: String,
    pub display_field: DisplayField,
    pub points: Vec<SeriesPoint>,
}

impl HistorySeries {
    pub fn empty(id: &str, display_field: DisplayField) -> Self {
        Self {
            id: id.to_string(),
            display_field,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct branches in order of first appearance.
    pub fn branches(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.points {
            if !seen.contains(&p.branch.as_str()) {
                seen.push(&p.branch);
            }
        }
        seen
    }
}

/// Build the display series of `id` from its raw points.
///
/// Scored tests plot `1 - metric`; a metric outside [0, 1] is clamped
/// first and logged. Unscored tests plot `data` unchanged. The output has
/// one point per input point, in input order.
pub fn normalize(id: &str, raw: &[HistoryPoint], scored: bool) -> HistorySeries {
    let display_field = if scored {
        DisplayField::Metric
    } else {
        DisplayField::Data
    };
    let points = raw
        .iter()
        .map(|p| {
            let value = if scored {
                p.metric.map(|m| 1.0 - clamp_metric(id, &p.commit, m))
            } else {
                p.data
            };
            to_series_point(p, value)
        })
        .collect();
    HistorySeries {
        id: id.to_string(),
        display_field,
        points,
    }
}

/// Series of the overall score. Its metric is already higher-is-better,
/// so it passes through without inversion.
pub fn total_series(raw: &[HistoryPoint]) -> HistorySeries {
    HistorySeries {
        id: TOTAL_KEY.to_string(),
        display_field: DisplayField::Metric,
        points: raw.iter().map(|p| to_series_point(p, p.metric)).collect(),
    }
}

fn to_series_point(p: &HistoryPoint, value: Option<f64>) -> SeriesPoint {
    SeriesPoint {
        commit: p.commit.clone(),
        branch: p.branch.clone(),
        value,
        time: p.time,
    }
}

fn clamp_metric(id: &str, commit: &str, m: f64) -> f64 {
    if (0.0..=1.0).contains(&m) {
        return m;
    }
    let clamped = if m.is_nan() { 0.0 } else { m.clamp(0.0, 1.0) };
    warn!(id, commit, metric = m, clamped, "history metric outside [0, 1]");
    clamped
}

pub fn run(
    settings: &Settings,
    report: &str,
    id: Option<&str>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut data = ReportData::new(settings.clone());
    data.load_report(source::open(report, &settings.fetch).as_ref())?;

    let series = match id {
        Some(id) => data.get_history(id),
        None => data.total_history(),
    };
    if json {
        print_json(&series, Some(report))?;
    } else {
        print_report(&series, Some(report));
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
