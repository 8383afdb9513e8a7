//! Per-identifier comparison of two scored reports.
//!
//! Identifiers are matched by exact string equality. The output lists the
//! current report's nodes in pre-order, then the nodes only the reference
//! has, each placed with its nearest ancestor that still exists.

mod report;

use std::collections::HashMap;
use std::error::Error;

use serde::Serialize;
use tracing::debug;

use crate::config::Settings;
use crate::facade::ReportData;
use crate::model::NodeId;
use crate::score::ScoredTree;
use crate::source;

pub use report::{print_json, print_report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Unchanged,
    Improved,
    Regressed,
    /// Only the current report has this identifier.
    Added,
    /// Only the reference report has this identifier.
    Removed,
}

impl DiffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Improved => "improved",
            Self::Regressed => "regressed",
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// Comparison of one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub id: String,
    pub current: Option<f64>,
    pub reference: Option<f64>,
    /// `current - reference`, when both scores are defined.
    pub delta: Option<f64>,
    pub status: DiffStatus,
}

/// Entry counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub improved: usize,
    pub regressed: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    pub fn of(entries: &[DiffEntry]) -> Self {
        let mut s = Self::default();
        for e in entries {
            match e.status {
                DiffStatus::Unchanged => s.unchanged += 1,
                DiffStatus::Improved => s.improved += 1,
                DiffStatus::Regressed => s.regressed += 1,
                DiffStatus::Added => s.added += 1,
                DiffStatus::Removed => s.removed += 1,
            }
        }
        s
    }

    pub fn changed(&self) -> usize {
        self.improved + self.regressed + self.added + self.removed
    }
}

/// Status of a node present in both reports. Undefined on either side
/// means there is nothing to compare.
pub fn compare(current: Option<f64>, reference: Option<f64>, epsilon: f64) -> DiffStatus {
    match (current, reference) {
        (Some(c), Some(r)) if r - c > epsilon => DiffStatus::Regressed,
        (Some(c), Some(r)) if c - r > epsilon => DiffStatus::Improved,
        _ => DiffStatus::Unchanged,
    }
}

/// Compare every identifier of `current` and `reference`.
///
/// `epsilon` must be >= 0; deltas whose magnitude does not exceed it are
/// `Unchanged`. The result is fully determined by the inputs.
pub fn diff(current: &ScoredTree, reference: &ScoredTree, epsilon: f64) -> Vec<DiffEntry> {
    let cur_order = current.tree().preorder();
    let mut entries = Vec::with_capacity(cur_order.len());

    for &n in &cur_order {
        let node = current.node(n);
        let id = node.node.id.as_str();
        let entry = match reference.get(id) {
            Some(r) => DiffEntry {
                id: id.to_string(),
                current: node.score,
                reference: r.score,
                delta: node.score.zip(r.score).map(|(c, r)| c - r),
                status: compare(node.score, r.score, epsilon),
            },
            None => DiffEntry {
                id: id.to_string(),
                current: node.score,
                reference: None,
                delta: None,
                status: DiffStatus::Added,
            },
        };
        entries.push(entry);
    }

    let position: HashMap<NodeId, usize> = cur_order
        .iter()
        .enumerate()
        .map(|(pos, &n)| (n, pos))
        .collect();

    // Reference DFS order is kept inside each group by the stable sort.
    let mut removed: Vec<(usize, DiffEntry)> = Vec::new();
    for n in reference.tree().preorder() {
        let node = reference.node(n);
        if current.tree().lookup(&node.node.id).is_some() {
            continue;
        }
        let anchor = nearest_shared_ancestor(current, reference, n);
        removed.push((
            position.get(&anchor).copied().unwrap_or(0),
            DiffEntry {
                id: node.node.id.clone(),
                current: None,
                reference: node.score,
                delta: None,
                status: DiffStatus::Removed,
            },
        ));
    }
    removed.sort_by_key(|(pos, _)| *pos);

    debug!(
        compared = entries.len(),
        removed = removed.len(),
        epsilon,
        "diffed reports"
    );
    entries.extend(removed.into_iter().map(|(_, e)| e));
    entries
}

/// Node in `current` matching the closest ancestor of reference node `n`.
/// Both roots share the empty identifier, so the walk always ends.
fn nearest_shared_ancestor(current: &ScoredTree, reference: &ScoredTree, n: NodeId) -> NodeId {
    let tree = reference.tree();
    let mut at = tree.node(n).parent;
    while let Some(p) = at {
        if let Some(found) = current.tree().lookup(&tree.node(p).id) {
            return found;
        }
        at = tree.node(p).parent;
    }
    0
}

pub fn run(
    settings: &Settings,
    current: &str,
    reference: &str,
    json: bool,
    changed_only: bool,
) -> Result<(), Box<dyn Error>> {
    let mut data = ReportData::new(settings.clone());
    data.load_report(source::open(current, &settings.fetch).as_ref())?;
    data.load_reference(source::open(reference, &settings.fetch).as_ref())?;

    let entries = data.get_diff();
    if json {
        print_json(entries, current, reference, changed_only)?;
    } else {
        print_report(entries, reference, changed_only);
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
