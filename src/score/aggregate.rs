//! Bottom-up score aggregation.
//!
//! Leaves are scored from their raw value (checks pass/fail, metrics via
//! `normalize.rs`). Every section and parameterized test then takes the
//! weighted mean of its children's defined scores. Nodes are visited in
//! reverse pre-order, so all children are final before their parent.

use serde::Serialize;

use super::normalize::normalize_metric;
use crate::error::MissingWeightError;
use crate::model::{LeafValue, NodeId, NodeKind, ResultNode, ResultTree, ScoringRule};

/// Weight used when a node declares none.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Computed score and effective weight of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeScore {
    /// `None` when the node has nothing to average (e.g. an empty section).
    pub score: Option<f64>,
    pub weight: f64,
}

/// A node together with its computed score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoredNode<'a> {
    #[serde(flatten)]
    pub node: &'a ResultNode,
    pub score: Option<f64>,
    pub weight: f64,
}

/// Result tree plus one [`NodeScore`] per node. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ScoredTree {
    tree: ResultTree,
    scores: Vec<NodeScore>,
}

/// Counts over the leaves of a scored tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total: Option<f64>,
    pub checks: usize,
    pub checks_passed: usize,
    pub metrics: usize,
    pub sections: usize,
}

/// Score every node of `tree`.
///
/// Fails only when a declared weight is negative.
pub fn aggregate(tree: ResultTree) -> Result<ScoredTree, MissingWeightError> {
    let scores = score_nodes(&tree)?;
    Ok(ScoredTree { tree, scores })
}

fn score_nodes(tree: &ResultTree) -> Result<Vec<NodeScore>, MissingWeightError> {
    let mut scores = vec![
        NodeScore {
            score: None,
            weight: DEFAULT_WEIGHT,
        };
        tree.len()
    ];

    for n in tree.bottom_up() {
        let node = tree.node(n);
        let weight = effective_weight(node)?;
        let score = match node.value {
            Some(LeafValue::Outcome(outcome)) => Some(if outcome.is_pass() { 1.0 } else { 0.0 }),
            Some(LeafValue::Number(v)) => Some(match &node.scoring {
                Some(rule) => normalize_metric(v, rule),
                None => normalize_metric(v, &ScoringRule::default()),
            }),
            None => weighted_mean(node.children.iter().map(|&c| scores[c])),
        };
        scores[n] = NodeScore { score, weight };
    }
    Ok(scores)
}

fn effective_weight(node: &ResultNode) -> Result<f64, MissingWeightError> {
    match node.weight {
        None => Ok(DEFAULT_WEIGHT),
        Some(w) if w < 0.0 => Err(MissingWeightError {
            id: node.id.clone(),
            weight: w,
        }),
        Some(w) => Ok(w),
    }
}

/// Weighted mean of the children with a defined score.
///
/// Children without a score are left out entirely rather than counted as
/// zero. Zero weights add nothing to either sum. Returns `None` when no
/// weight remains.
///
/// Weights are divided by the largest one first, so the sums stay finite
/// for any finite weights.
pub fn weighted_mean(children: impl Iterator<Item = NodeScore>) -> Option<f64> {
    let defined: Vec<(f64, f64)> = children
        .filter_map(|c| c.score.map(|s| (s, c.weight)))
        .collect();
    let max_weight = defined.iter().map(|&(_, w)| w).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (s, w) in defined {
        let w = w / max_weight;
        weighted_sum += s * w;
        weight_sum += w;
    }
    if weight_sum > 0.0 {
        Some(weighted_sum / weight_sum)
    } else {
        None
    }
}

impl ScoredTree {
    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn node(&self, n: NodeId) -> ScoredNode<'_> {
        let NodeScore { score, weight } = self.scores[n];
        ScoredNode {
            node: self.tree.node(n),
            score,
            weight,
        }
    }

    pub fn get(&self, id: &str) -> Option<ScoredNode<'_>> {
        self.tree.lookup(id).map(|n| self.node(n))
    }

    pub fn root(&self) -> ScoredNode<'_> {
        self.node(0)
    }

    /// Overall score of the report.
    pub fn total(&self) -> Option<f64> {
        self.scores[0].score
    }

    pub fn score_of(&self, n: NodeId) -> Option<f64> {
        self.scores[n].score
    }

    /// Scored nodes in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = ScoredNode<'_>> + '_ {
        self.tree.preorder().into_iter().map(|n| self.node(n))
    }

    pub fn summary(&self) -> ScoreSummary {
        let mut summary = ScoreSummary {
            total: self.total(),
            checks: 0,
            checks_passed: 0,
            metrics: 0,
            sections: 0,
        };
        for (node, score) in self.tree.nodes().iter().zip(&self.scores) {
            match node.kind {
                NodeKind::Check => {
                    summary.checks += 1;
                    if score.score == Some(1.0) {
                        summary.checks_passed += 1;
                    }
                }
                NodeKind::Metric => summary.metrics += 1,
                NodeKind::Section if node.parent.is_some() => summary.sections += 1,
                _ => {}
            }
        }
        summary
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
