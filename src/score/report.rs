use std::collections::HashMap;

use serde::Serialize;

use super::{ScoreSummary, ScoredNode, ScoredTree};
use crate::diff::DiffEntry;
use crate::model::{LeafValue, NodeId, NodeKind};
use crate::report_helpers;

const NAME_WIDTH: usize = 44;

/// Everything the score report prints.
pub(super) struct ReportView<'a> {
    pub scored: &'a ScoredTree,
    /// Diff against the reference; empty when there is none.
    pub diff: &'a [DiffEntry],
    pub target: &'a str,
    pub reference: Option<&'a str>,
    /// Deepest level shown; the root is level 0.
    pub depth: Option<usize>,
}

impl ReportView<'_> {
    fn visible(&self) -> Vec<(NodeId, usize)> {
        let tree = self.scored.tree();
        tree.preorder()
            .into_iter()
            .skip(1)
            .map(|n| (n, tree.depth(n)))
            .filter(|&(_, d)| self.depth.is_none_or(|max| d <= max))
            .collect()
    }

    fn deltas(&self) -> HashMap<&str, Option<f64>> {
        self.diff.iter().map(|e| (e.id.as_str(), e.delta)).collect()
    }
}

fn kind_label(node: &ScoredNode<'_>) -> String {
    match node.node.kind {
        NodeKind::Section => "section".to_string(),
        NodeKind::Check => "check".to_string(),
        NodeKind::Metric => "metric".to_string(),
        NodeKind::Parameterized(class) => {
            format!("{}×{}", class.as_str(), node.node.children.len())
        }
    }
}

fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) => format!("{:+.1}", d * 100.0),
        None => "-".to_string(),
    }
}

/// Print the scored tree as an indented table with a summary header.
pub(super) fn print_report(view: &ReportView<'_>) {
    let separator = report_helpers::separator(80);
    let root = view.scored.root();
    let summary = view.scored.summary();

    if root.node.title.is_empty() {
        println!("Test Report Score: {}", view.target);
    } else {
        println!("Test Report Score: {} ({})", root.node.title, view.target);
    }
    println!("{separator}");
    println!(
        " Overall Score:  {}",
        report_helpers::format_percent(summary.total)
    );
    println!(
        " Checks Passed:  {}/{}",
        summary.checks_passed, summary.checks
    );
    println!(" Metrics:        {}", summary.metrics);
    println!(" Sections:       {}", summary.sections);
    let deltas = view.deltas();
    if let Some(reference) = view.reference {
        println!(
            " vs {reference}:  {} pts",
            format_delta(deltas.get("").copied().flatten())
        );
    }
    println!("{separator}");

    let with_delta = view.reference.is_some();
    print!(
        " {} {:<10} {:>6} {:>8}",
        report_helpers::fit_width("Test", NAME_WIDTH),
        "Kind",
        "Weight",
        "Score"
    );
    if with_delta {
        print!(" {:>7}", "Delta");
    }
    println!();
    println!("{separator}");

    for (n, depth) in view.visible() {
        let node = view.scored.node(n);
        let indent = "  ".repeat(depth.saturating_sub(1));
        let name = format!("{indent}{}", node.node.id);
        print!(
            " {} {:<10} {:>6.2} {:>8}",
            report_helpers::fit_width(&name, NAME_WIDTH),
            kind_label(&node),
            node.weight,
            report_helpers::format_percent(node.score),
        );
        if with_delta {
            let delta = deltas.get(node.node.id.as_str()).copied().flatten();
            print!(" {:>7}", format_delta(delta));
        }
        println!();
    }

    println!("{separator}");
}

// --- JSON output ---

#[derive(Serialize)]
struct JsonNode<'a> {
    id: &'a str,
    title: &'a str,
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<LeafValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<&'a str>,
    weight: f64,
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'a>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
    summary: ScoreSummary,
    tree: JsonNode<'a>,
}

fn json_node<'a>(
    scored: &'a ScoredTree,
    n: NodeId,
    level: usize,
    max_depth: Option<usize>,
    deltas: &HashMap<&str, Option<f64>>,
) -> JsonNode<'a> {
    let node = scored.node(n);
    let children = if max_depth.is_some_and(|max| level >= max) {
        Vec::new()
    } else {
        node.node
            .children
            .iter()
            .map(|&c| json_node(scored, c, level + 1, max_depth, deltas))
            .collect()
    };
    JsonNode {
        id: &node.node.id,
        title: &node.node.title,
        kind: node.node.kind,
        value: node.node.value,
        unit: node.node.unit.as_deref(),
        weight: node.weight,
        score: node.score,
        delta: deltas.get(node.node.id.as_str()).copied().flatten(),
        children,
    }
}

/// Serialize the scored tree to nested JSON and print to stdout.
pub(super) fn print_json(view: &ReportView<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let deltas = view.deltas();
    let json = JsonReport {
        target: view.target,
        reference: view.reference,
        summary: view.scored.summary(),
        tree: json_node(view.scored, 0, 0, view.depth, &deltas),
    };
    report_helpers::print_json_stdout(&json)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
