//! Report document to [`ResultTree`].
//!
//! The document's `tests` (and the `tests` of any declared `sections`) are
//! collected in document order, then inserted into the arena one by one.
//! Every namespace prefix of a test identifier becomes a section on the way.

use std::collections::{HashMap, HashSet};

use chrono::DateTime;
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    Breakpoint, Direction, LeafValue, NodeId, NodeKind, Outcome, ParamRef, ROOT_ID, ResultNode,
    ResultTree, ScoringRule, is_within, last_segment, namespace_prefixes, param_id,
};
use crate::classify::{TestClass, classify_record};
use crate::error::MalformedReportError;
use crate::history::{HistoryPoint, TOTAL_KEY};

/// Nesting limit for declared sections. Real reports stay far below it;
/// anything deeper is treated as a self-referencing document.
const MAX_SECTION_DEPTH: usize = 64;

type Record = Map<String, Value>;

/// Entry collected from a document body, in document order.
enum Item<'a> {
    Section {
        id: &'a str,
        title: Option<&'a str>,
        weight: Option<f64>,
    },
    Test {
        id: &'a str,
        record: &'a Record,
    },
}

/// The optional `score` block: weights and metric scoring rules.
#[derive(Default)]
struct ScoreMeta<'a> {
    weights: Vec<(&'a str, f64)>,
    metrics: HashMap<&'a str, &'a Record>,
}

/// Parse a report document into a result tree.
pub fn parse(doc: &Value) -> Result<ResultTree, MalformedReportError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| MalformedReportError::new("document must be a JSON object"))?;
    match obj.get("tests") {
        Some(Value::Object(_)) => {}
        Some(_) => return Err(MalformedReportError::new("`tests` must be an object")),
        None => return Err(MalformedReportError::new("missing required `tests` object")),
    }

    let meta = parse_score_meta(obj.get("score"))?;
    let title = optional_str(obj.get("title"), ROOT_ID, "title")?.unwrap_or_default();

    let mut items = Vec::new();
    collect_body(obj, None, 0, &mut items)?;

    let mut builder = TreeBuilder::new(title);
    for item in items {
        match item {
            Item::Section { id, title, weight } => builder.declare_section(id, title, weight)?,
            Item::Test { id, record } => builder.add_test(id, record, &meta)?,
        }
    }

    for (id, weight) in &meta.weights {
        match builder.index.get(*id) {
            Some(&n) => builder.nodes[n].weight = Some(*weight),
            None => debug!(id, "score weight for unknown identifier ignored"),
        }
    }
    for id in meta.metrics.keys() {
        if !builder.index.contains_key(*id) {
            debug!(id, "metric rule for unknown identifier ignored");
        }
    }

    let history = parse_history(obj.get("history"))?;
    debug!(
        nodes = builder.nodes.len(),
        histories = history.len(),
        "parsed report"
    );
    Ok(ResultTree::from_parts(builder.nodes, builder.index, history))
}

/// Collect the tests and nested sections of one body.
fn collect_body<'a>(
    body: &'a Record,
    owner: Option<&'a str>,
    depth: usize,
    items: &mut Vec<Item<'a>>,
) -> Result<(), MalformedReportError> {
    if depth > MAX_SECTION_DEPTH {
        return Err(MalformedReportError::at(
            owner.unwrap_or(ROOT_ID),
            format!("sections nested deeper than {MAX_SECTION_DEPTH} levels"),
        ));
    }
    let where_ = owner.unwrap_or(ROOT_ID);

    if let Some(tests) = body.get("tests") {
        let tests = tests
            .as_object()
            .ok_or_else(|| MalformedReportError::at(where_, "`tests` must be an object"))?;
        for (id, record) in tests {
            validate_identifier(id)?;
            check_containment(id, owner)?;
            let record = record
                .as_object()
                .ok_or_else(|| MalformedReportError::at(id, "test record must be an object"))?;
            items.push(Item::Test {
                id: id.as_str(),
                record,
            });
        }
    }

    if let Some(sections) = body.get("sections") {
        let sections = sections
            .as_object()
            .ok_or_else(|| MalformedReportError::at(where_, "`sections` must be an object"))?;
        for (id, section) in sections {
            validate_identifier(id)?;
            check_containment(id, owner)?;
            let section = section
                .as_object()
                .ok_or_else(|| MalformedReportError::at(id, "section must be an object"))?;
            items.push(Item::Section {
                id: id.as_str(),
                title: optional_str(section.get("title"), id, "title")?,
                weight: read_weight(section.get("weight"), id)?,
            });
            collect_body(section, Some(id.as_str()), depth + 1, items)?;
        }
    }
    Ok(())
}

fn validate_identifier(id: &str) -> Result<(), MalformedReportError> {
    if id.is_empty() {
        return Err(MalformedReportError::new("empty test identifier"));
    }
    if id.contains(['[', ']']) {
        return Err(MalformedReportError::at(
            id,
            "`[` and `]` are reserved for parameter identifiers",
        ));
    }
    if id.split([':', '.']).any(str::is_empty) {
        return Err(MalformedReportError::at(id, "identifier has an empty segment"));
    }
    if id.split([':', '.']).next() == Some(TOTAL_KEY) {
        return Err(MalformedReportError::at(
            id,
            "`total` is reserved for the overall score history",
        ));
    }
    Ok(())
}

fn check_containment(id: &str, owner: Option<&str>) -> Result<(), MalformedReportError> {
    match owner {
        Some(section) if !is_within(id, section) => Err(MalformedReportError::at(
            id,
            format!("lies outside its section `{section}`"),
        )),
        _ => Ok(()),
    }
}

/// Arena under construction.
struct TreeBuilder {
    nodes: Vec<ResultNode>,
    index: HashMap<String, NodeId>,
    declared: HashSet<String>,
}

impl TreeBuilder {
    fn new(title: &str) -> Self {
        let root = ResultNode {
            id: ROOT_ID.to_string(),
            title: title.to_string(),
            kind: NodeKind::Section,
            value: None,
            unit: None,
            weight: None,
            scoring: None,
            param: None,
            parent: None,
            children: Vec::new(),
        };
        let mut index = HashMap::new();
        index.insert(ROOT_ID.to_string(), 0);
        Self {
            nodes: vec![root],
            index,
            declared: HashSet::new(),
        }
    }

    fn push(&mut self, mut node: ResultNode, parent: NodeId) -> NodeId {
        let n = self.nodes.len();
        node.parent = Some(parent);
        self.index.insert(node.id.clone(), n);
        self.nodes[parent].children.push(n);
        self.nodes.push(node);
        n
    }

    /// Find or create the section `id` and all its enclosing sections.
    fn section(&mut self, id: &str) -> Result<NodeId, MalformedReportError> {
        let mut parent = 0;
        for ns in namespace_prefixes(id).into_iter().chain(std::iter::once(id)) {
            parent = match self.index.get(ns) {
                Some(&n) if self.nodes[n].kind == NodeKind::Section => n,
                Some(_) => {
                    return Err(MalformedReportError::at(
                        ns,
                        "identifier is both a test and a section",
                    ));
                }
                None => self.push(section_node(ns), parent),
            };
        }
        Ok(parent)
    }

    /// Parent section of a test, created on demand.
    fn parent_of(&mut self, id: &str) -> Result<NodeId, MalformedReportError> {
        match namespace_prefixes(id).last() {
            Some(ns) => self.section(ns),
            None => Ok(0),
        }
    }

    fn declare_section(
        &mut self,
        id: &str,
        title: Option<&str>,
        weight: Option<f64>,
    ) -> Result<(), MalformedReportError> {
        if !self.declared.insert(id.to_string()) {
            return Err(MalformedReportError::at(id, "section declared twice"));
        }
        let n = self.section(id)?;
        if let Some(title) = title {
            self.nodes[n].title = title.to_string();
        }
        if weight.is_some() {
            self.nodes[n].weight = weight;
        }
        Ok(())
    }

    fn add_test(
        &mut self,
        id: &str,
        record: &Record,
        meta: &ScoreMeta<'_>,
    ) -> Result<(), MalformedReportError> {
        if let Some(&n) = self.index.get(id) {
            let reason = if self.nodes[n].kind == NodeKind::Section {
                "identifier is both a test and a section"
            } else {
                "duplicate test identifier"
            };
            return Err(MalformedReportError::at(id, reason));
        }
        let parent = self.parent_of(id)?;

        let rule_meta = meta.metrics.get(id).copied();
        let class = classify_record(id, record, rule_meta.is_some())?;
        let title = optional_str(record.get("title"), id, "title")?.unwrap_or(last_segment(id));
        let unit = optional_str(record.get("unit"), id, "unit")?.map(String::from);
        let weight = read_weight(record.get("weight"), id)?;
        let scoring = match class {
            TestClass::Metric => Some(parse_rule(id, record, rule_meta)?),
            TestClass::Check => None,
        };

        let leaf = |id: String, title: String, value: LeafValue, param: Option<ParamRef>| {
            ResultNode {
                id,
                title,
                kind: match class {
                    TestClass::Check => NodeKind::Check,
                    TestClass::Metric => NodeKind::Metric,
                },
                value: Some(value),
                unit: unit.clone(),
                weight: None,
                scoring: scoring.clone(),
                param,
                parent: None,
                children: Vec::new(),
            }
        };

        let value_key = match class {
            TestClass::Check => "outcome",
            TestClass::Metric => "value",
        };
        let raw = record.get(value_key);

        match record.get("params") {
            None => {
                let raw = raw.ok_or_else(|| {
                    MalformedReportError::at(id, format!("{} is missing `{value_key}`", class.as_str()))
                })?;
                let mut node = leaf(id.to_string(), title.to_string(), read_value(id, class, raw)?, None);
                node.weight = weight;
                self.push(node, parent);
            }
            Some(Value::Array(labels)) => {
                let values = match raw {
                    Some(Value::Array(values)) if values.len() == labels.len() => values,
                    _ => {
                        return Err(MalformedReportError::at(
                            id,
                            format!(
                                "parameterized test needs `{value_key}` as an array of {} entries",
                                labels.len()
                            ),
                        ));
                    }
                };
                let group = ResultNode {
                    id: id.to_string(),
                    title: title.to_string(),
                    kind: NodeKind::Parameterized(class),
                    value: None,
                    unit: unit.clone(),
                    weight,
                    scoring: None,
                    param: None,
                    parent: None,
                    children: Vec::new(),
                };
                let group = self.push(group, parent);
                for (index, (label, raw)) in labels.iter().zip(values).enumerate() {
                    let child_id = param_id(id, index);
                    if self.index.contains_key(&child_id) {
                        return Err(MalformedReportError::at(child_id, "duplicate test identifier"));
                    }
                    let label = read_label(id, label)?;
                    let value = read_value(&child_id, class, raw)?;
                    let param = ParamRef {
                        base: id.to_string(),
                        index,
                        label: label.clone(),
                    };
                    let node = leaf(child_id, format!("{title} [{label}]"), value, Some(param));
                    self.push(node, group);
                }
            }
            Some(_) => return Err(MalformedReportError::at(id, "`params` must be an array")),
        }
        Ok(())
    }
}

fn section_node(id: &str) -> ResultNode {
    ResultNode {
        id: id.to_string(),
        title: last_segment(id).to_string(),
        kind: NodeKind::Section,
        value: None,
        unit: None,
        weight: None,
        scoring: None,
        param: None,
        parent: None,
        children: Vec::new(),
    }
}

fn read_value(id: &str, class: TestClass, raw: &Value) -> Result<LeafValue, MalformedReportError> {
    match class {
        TestClass::Check => read_outcome(id, raw).map(LeafValue::Outcome),
        TestClass::Metric => match raw {
            Value::Number(n) => n
                .as_f64()
                .map(LeafValue::Number)
                .ok_or_else(|| MalformedReportError::at(id, "metric value out of range")),
            _ => Err(MalformedReportError::at(id, "metric value must be a number")),
        },
    }
}

fn read_outcome(id: &str, raw: &Value) -> Result<Outcome, MalformedReportError> {
    match raw {
        Value::Bool(true) => Ok(Outcome::Passed),
        Value::Bool(false) => Ok(Outcome::Failed),
        Value::String(s) => match s.as_str() {
            "passed" => Ok(Outcome::Passed),
            "failed" => Ok(Outcome::Failed),
            "skipped" => Ok(Outcome::Skipped),
            "errored" | "error" => Ok(Outcome::Errored),
            other => Err(MalformedReportError::at(id, format!("unknown outcome {other:?}"))),
        },
        _ => Err(MalformedReportError::at(
            id,
            "check outcome must be a boolean or one of passed/failed/skipped/errored",
        )),
    }
}

fn read_label(id: &str, raw: &Value) -> Result<String, MalformedReportError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(MalformedReportError::at(id, "parameter labels must be strings or numbers")),
    }
}

fn read_number(raw: Option<&Value>, id: &str, key: &str) -> Result<Option<f64>, MalformedReportError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(MalformedReportError::at(id, format!("`{key}` must be a number"))),
    }
}

fn read_weight(raw: Option<&Value>, id: &str) -> Result<Option<f64>, MalformedReportError> {
    read_number(raw, id, "weight")
}

fn optional_str<'a>(
    raw: Option<&'a Value>,
    id: &str,
    key: &str,
) -> Result<Option<&'a str>, MalformedReportError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(MalformedReportError::at(id, format!("`{key}` must be a string"))),
    }
}

/// Scoring rule of a metric. Fields in the `score.metrics` entry take
/// precedence over the same fields on the test record.
fn parse_rule(
    id: &str,
    record: &Record,
    rule_meta: Option<&Record>,
) -> Result<ScoringRule, MalformedReportError> {
    let field = |key: &str| rule_meta.and_then(|m| m.get(key)).or_else(|| record.get(key));

    let direction = match optional_str(field("direction"), id, "direction")? {
        None => Direction::default(),
        Some(s) => Direction::parse(s)
            .ok_or_else(|| MalformedReportError::at(id, format!("unknown direction {s:?}")))?,
    };

    if let Some(curve) = field("curve") {
        let points = parse_curve(id, curve, direction)?;
        return Ok(ScoringRule::Curve { direction, points });
    }

    let min = read_number(field("min"), id, "min")?.unwrap_or(0.0);
    let max = read_number(field("max"), id, "max")?.unwrap_or(1.0);
    if min >= max {
        return Err(MalformedReportError::at(
            id,
            format!("metric domain is empty (min {min} >= max {max})"),
        ));
    }
    if !(max - min).is_finite() {
        return Err(MalformedReportError::at(
            id,
            format!("metric domain is too wide (max {max} - min {min} overflows)"),
        ));
    }
    Ok(ScoringRule::Linear {
        direction,
        min,
        max,
    })
}

/// A curve is a list of `[input, score]` pairs with strictly ascending
/// inputs and scores in [0, 1] that move in the metric's direction.
fn parse_curve(
    id: &str,
    raw: &Value,
    direction: Direction,
) -> Result<Vec<Breakpoint>, MalformedReportError> {
    let bad = |reason: &str| MalformedReportError::at(id, format!("invalid curve: {reason}"));
    let pairs = raw.as_array().ok_or_else(|| bad("must be an array"))?;
    if pairs.is_empty() {
        return Err(bad("needs at least one breakpoint"));
    }

    let mut points = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let point = match pair.as_array().map(Vec::as_slice) {
            Some([input, score]) => match (input.as_f64(), score.as_f64()) {
                (Some(input), Some(score)) => Breakpoint { input, score },
                _ => return Err(bad("breakpoints must be numbers")),
            },
            _ => return Err(bad("breakpoints must be [input, score] pairs")),
        };
        if !(0.0..=1.0).contains(&point.score) {
            return Err(bad("scores must lie in [0, 1]"));
        }
        points.push(point);
    }

    for w in points.windows(2) {
        if w[1].input <= w[0].input {
            return Err(bad("inputs must be strictly ascending"));
        }
        let monotone = match direction {
            Direction::HigherIsBetter => w[1].score >= w[0].score,
            Direction::LowerIsBetter => w[1].score <= w[0].score,
        };
        if !monotone {
            return Err(bad("scores must follow the metric direction"));
        }
    }
    Ok(points)
}

fn parse_score_meta(raw: Option<&Value>) -> Result<ScoreMeta<'_>, MalformedReportError> {
    let block = match raw {
        None | Some(Value::Null) => return Ok(ScoreMeta::default()),
        Some(Value::Object(block)) => block,
        Some(_) => return Err(MalformedReportError::new("`score` must be an object")),
    };

    let mut meta = ScoreMeta::default();
    if let Some(weights) = block.get("weights") {
        let weights = weights
            .as_object()
            .ok_or_else(|| MalformedReportError::new("`score.weights` must be an object"))?;
        for (id, w) in weights {
            if let Some(w) = read_weight(Some(w), id)? {
                meta.weights.push((id.as_str(), w));
            }
        }
    }
    if let Some(metrics) = block.get("metrics") {
        let metrics = metrics
            .as_object()
            .ok_or_else(|| MalformedReportError::new("`score.metrics` must be an object"))?;
        for (id, rule) in metrics {
            let rule = rule
                .as_object()
                .ok_or_else(|| MalformedReportError::at(id, "metric rule must be an object"))?;
            meta.metrics.insert(id.as_str(), rule);
        }
    }
    Ok(meta)
}

fn parse_history(
    raw: Option<&Value>,
) -> Result<HashMap<String, Vec<HistoryPoint>>, MalformedReportError> {
    let block = match raw {
        None | Some(Value::Null) => return Ok(HashMap::new()),
        Some(Value::Object(block)) => block,
        Some(_) => return Err(MalformedReportError::new("`history` must be an object")),
    };

    let mut history = HashMap::with_capacity(block.len());
    for (id, entries) in block {
        let entries = entries
            .as_array()
            .ok_or_else(|| MalformedReportError::at(id, "history must be an array"))?;
        let points = entries
            .iter()
            .map(|e| parse_history_point(id, e))
            .collect::<Result<Vec<_>, _>>()?;
        history.insert(id.clone(), points);
    }
    Ok(history)
}

fn parse_history_point(id: &str, raw: &Value) -> Result<HistoryPoint, MalformedReportError> {
    let entry = raw
        .as_object()
        .ok_or_else(|| MalformedReportError::at(id, "history entry must be an object"))?;
    let commit = match entry.get("commit") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(MalformedReportError::at(id, "history entry needs a `commit`")),
    };
    let branch = optional_str(entry.get("branch"), id, "branch")?
        .unwrap_or_default()
        .to_string();
    let time = match optional_str(entry.get("time"), id, "time")? {
        None => None,
        Some(s) => Some(DateTime::parse_from_rfc3339(s).map_err(|e| {
            MalformedReportError::at(id, format!("history time {s:?} is not RFC 3339: {e}"))
        })?),
    };
    Ok(HistoryPoint {
        commit,
        branch,
        data: read_number(entry.get("data"), id, "data")?,
        metric: read_number(entry.get("metric"), id, "metric")?,
        time,
    })
}
