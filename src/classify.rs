//! Check vs. metric classification.
//!
//! Classification is metadata only: a record's declared `type`, else its
//! presence in the `score.metrics` block. The value's JSON type is never
//! used to guess, so a boolean can not turn into a metric or the reverse.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MalformedReportError;
use crate::model::{NodeKind, ResultNode};

/// What a leaf test measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestClass {
    /// Boolean pass/fail outcome.
    Check,
    /// Continuous, score-bearing value.
    Metric,
}

impl TestClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Metric => "metric",
        }
    }
}

/// Class of a parsed node. `None` for sections, which hold no test.
/// A parameterized test has the class of its expanded leaves.
pub fn classify(node: &ResultNode) -> Option<TestClass> {
    match node.kind {
        NodeKind::Section => None,
        NodeKind::Check => Some(TestClass::Check),
        NodeKind::Metric => Some(TestClass::Metric),
        NodeKind::Parameterized(class) => Some(class),
    }
}

/// Whether a node carries a scored metric.
pub fn is_scored(node: &ResultNode) -> bool {
    classify(node) == Some(TestClass::Metric)
}

/// Decide the class of a raw leaf record from its metadata.
///
/// `has_metric_rule` is true when `score.metrics` lists the identifier.
pub fn classify_record(
    id: &str,
    record: &Map<String, Value>,
    has_metric_rule: bool,
) -> Result<TestClass, MalformedReportError> {
    let class = match record.get("type") {
        Some(Value::String(t)) => match t.as_str() {
            "check" => TestClass::Check,
            "metric" => TestClass::Metric,
            other => {
                return Err(MalformedReportError::at(
                    id,
                    format!("unknown test type {other:?} (expected \"check\" or \"metric\")"),
                ));
            }
        },
        Some(_) => return Err(MalformedReportError::at(id, "`type` must be a string")),
        None if has_metric_rule => TestClass::Metric,
        None => TestClass::Check,
    };

    if class == TestClass::Check && has_metric_rule {
        return Err(MalformedReportError::at(
            id,
            "declared as a check but has a metric scoring rule",
        ));
    }
    Ok(class)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
