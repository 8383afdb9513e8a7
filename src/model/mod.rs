//! Typed result tree.
//!
//! A report is parsed once into an arena of [`ResultNode`]s. Sections are
//! derived from the `:`/`.`-delimited identifiers, parameterized tests are
//! expanded into synthetic `base[index]` leaves, and an identifier index
//! gives constant-time lookup afterwards.

mod parse;

use std::collections::HashMap;

use serde::Serialize;

use crate::classify::TestClass;
use crate::history::HistoryPoint;

pub use parse::parse;

/// Index of a node inside its tree's arena.
pub type NodeId = usize;

/// Identifier of the root section.
pub const ROOT_ID: &str = "";

/// Shape of a node in the result hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Internal node grouping other nodes.
    Section,
    /// Boolean leaf.
    Check,
    /// Continuous leaf.
    Metric,
    /// Test evaluated over a list of parameters; its children are the
    /// synthetic per-parameter leaves of the given class.
    Parameterized(TestClass),
}

/// Outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Errored,
}

impl Outcome {
    pub fn is_pass(self) -> bool {
        self == Self::Passed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Errored => "errored",
        }
    }
}

/// Raw value carried by a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LeafValue {
    Outcome(Outcome),
    Number(f64),
}

/// Which end of a metric's domain is good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    /// Metrics usually count the share of offending items.
    #[default]
    LowerIsBetter,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "higher_is_better" | "higher" | "more_is_better" => Some(Self::HigherIsBetter),
            "lower_is_better" | "lower" | "less_is_better" => Some(Self::LowerIsBetter),
            _ => None,
        }
    }
}

/// One point of a piecewise linear scoring curve: raw `input` maps to
/// `score` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakpoint {
    pub input: f64,
    pub score: f64,
}

/// Declared rule turning a metric's raw value into a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringRule {
    /// Linear over `[min, max]`, clamped outside it.
    Linear {
        direction: Direction,
        min: f64,
        max: f64,
    },
    /// Piecewise linear through the breakpoints, clamped beyond the ends.
    Curve {
        direction: Direction,
        points: Vec<Breakpoint>,
    },
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self::Linear {
            direction: Direction::default(),
            min: 0.0,
            max: 1.0,
        }
    }
}

impl ScoringRule {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Linear { direction, .. } | Self::Curve { direction, .. } => *direction,
        }
    }
}

/// Back-reference from a synthetic `base[index]` leaf to its test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamRef {
    pub base: String,
    pub index: usize,
    pub label: String,
}

/// A node of the parsed result tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultNode {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LeafValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Declared weight; `None` means the default of 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<ParamRef>,
    #[serde(skip)]
    pub parent: Option<NodeId>,
    #[serde(skip)]
    pub children: Vec<NodeId>,
}

impl ResultNode {
    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }
}

/// Parsed report: node arena, identifier index and raw history.
#[derive(Debug, Clone)]
pub struct ResultTree {
    nodes: Vec<ResultNode>,
    index: HashMap<String, NodeId>,
    history: HashMap<String, Vec<HistoryPoint>>,
}

impl ResultTree {
    pub(crate) fn from_parts(
        nodes: Vec<ResultNode>,
        index: HashMap<String, NodeId>,
        history: HashMap<String, Vec<HistoryPoint>>,
    ) -> Self {
        Self {
            nodes,
            index,
            history,
        }
    }

    pub fn root(&self) -> &ResultNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &ResultNode {
        &self.nodes[id]
    }

    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&ResultNode> {
        self.lookup(id).map(|n| &self.nodes[n])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ResultNode] {
        &self.nodes
    }

    /// Raw history of one identifier, if the report has any.
    pub fn history(&self, id: &str) -> Option<&[HistoryPoint]> {
        self.history.get(id).map(Vec::as_slice)
    }

    /// Leaf at `index` of a parameterized test. A plain leaf answers
    /// index 0 with itself.
    pub fn param(&self, id: &str, index: usize) -> Option<&ResultNode> {
        let node = self.get(id)?;
        match node.kind {
            NodeKind::Parameterized(_) => node.children.get(index).map(|&c| &self.nodes[c]),
            NodeKind::Check | NodeKind::Metric if index == 0 => Some(node),
            _ => None,
        }
    }

    /// Map a synthetic `base[index]` identifier to its test identifier.
    pub fn base_id<'a>(&'a self, id: &'a str) -> &'a str {
        match self.get(id).and_then(|n| n.param.as_ref()) {
            Some(p) => &p.base,
            None => id,
        }
    }

    /// Node ids in depth-first pre-order, children in document order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(n) = stack.pop() {
            order.push(n);
            stack.extend(self.nodes[n].children.iter().rev());
        }
        order
    }

    /// Node ids with every child before its parent (reversed pre-order).
    pub fn bottom_up(&self) -> Vec<NodeId> {
        let mut order = self.preorder();
        order.reverse();
        order
    }

    /// Depth of a node below the root.
    pub fn depth(&self, mut id: NodeId) -> usize {
        let mut depth = 0;
        while let Some(p) = self.nodes[id].parent {
            depth += 1;
            id = p;
        }
        depth
    }
}

/// Namespace prefixes of an identifier, outermost first:
/// `"a:b.c"` yields `["a", "a:b"]`.
pub fn namespace_prefixes(id: &str) -> Vec<&str> {
    id.char_indices()
        .filter(|(_, c)| is_delimiter(*c))
        .map(|(i, _)| &id[..i])
        .collect()
}

/// Last segment of an identifier, used as a default title.
pub fn last_segment(id: &str) -> &str {
    match id.rfind(is_delimiter) {
        Some(i) => &id[i + 1..],
        None => id,
    }
}

fn is_delimiter(c: char) -> bool {
    c == ':' || c == '.'
}

/// Whether `id` lies strictly inside namespace `ns`.
pub fn is_within(id: &str, ns: &str) -> bool {
    ns.is_empty()
        || (id.len() > ns.len()
            && id.starts_with(ns)
            && id[ns.len()..].starts_with(is_delimiter))
}

/// Synthetic identifier of one parameter of a test.
pub fn param_id(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
