use super::*;
use serde_json::json;

fn sample() -> serde_json::Value {
    json!({
        "title": "Core model",
        "tests": {
            "basic:model_id": {"type": "check", "outcome": true, "title": "Model ID"},
            "basic:metabolites": {"type": "check", "outcome": "failed"},
            "consistency:stoichiometry": {
                "type": "metric",
                "value": 0.25,
                "unit": "fraction",
                "direction": "lower_is_better"
            },
            "annotation:met.db": {
                "type": "metric",
                "params": ["kegg", "chebi", 7],
                "value": [0.1, 0.5, 0.9]
            }
        },
        "sections": {
            "basic": {"title": "Basic Information"},
            "empty": {"title": "Nothing here"}
        }
    })
}

#[test]
fn builds_sections_from_identifiers() {
    let tree = parse(&sample()).unwrap();

    assert_eq!(tree.root().title, "Core model");
    assert_eq!(tree.root().kind, NodeKind::Section);

    let basic = tree.get("basic").unwrap();
    assert_eq!(basic.kind, NodeKind::Section);
    assert_eq!(basic.title, "Basic Information");
    assert_eq!(basic.children.len(), 2);

    // `annotation:met.db` nests under `annotation` and `annotation:met`.
    let met = tree.get("annotation:met").unwrap();
    assert_eq!(met.kind, NodeKind::Section);
    assert_eq!(met.title, "met");
    let db = tree.get("annotation:met.db").unwrap();
    assert_eq!(db.parent, tree.lookup("annotation:met"));
}

#[test]
fn children_keep_document_order() {
    let tree = parse(&sample()).unwrap();
    let top: Vec<&str> = tree
        .root()
        .children
        .iter()
        .map(|&c| tree.node(c).id.as_str())
        .collect();
    assert_eq!(top, vec!["basic", "consistency", "annotation", "empty"]);
}

#[test]
fn leaf_values_and_titles() {
    let tree = parse(&sample()).unwrap();

    let id = tree.get("basic:model_id").unwrap();
    assert_eq!(id.title, "Model ID");
    assert_eq!(id.value, Some(LeafValue::Outcome(Outcome::Passed)));

    let mets = tree.get("basic:metabolites").unwrap();
    assert_eq!(mets.title, "metabolites");
    assert_eq!(mets.value, Some(LeafValue::Outcome(Outcome::Failed)));

    let stoich = tree.get("consistency:stoichiometry").unwrap();
    assert_eq!(stoich.kind, NodeKind::Metric);
    assert_eq!(stoich.value, Some(LeafValue::Number(0.25)));
    assert_eq!(stoich.unit.as_deref(), Some("fraction"));
    assert_eq!(
        stoich.scoring,
        Some(ScoringRule::Linear {
            direction: Direction::LowerIsBetter,
            min: 0.0,
            max: 1.0
        })
    );
}

#[test]
fn parameterized_tests_expand_to_synthetic_leaves() {
    let tree = parse(&sample()).unwrap();

    let db = tree.get("annotation:met.db").unwrap();
    assert_eq!(db.kind, NodeKind::Parameterized(TestClass::Metric));
    assert!(db.value.is_none());
    assert_eq!(db.children.len(), 3);

    let third = tree.get("annotation:met.db[2]").unwrap();
    assert_eq!(third.value, Some(LeafValue::Number(0.9)));
    assert_eq!(
        third.param,
        Some(ParamRef {
            base: "annotation:met.db".into(),
            index: 2,
            label: "7".into()
        })
    );
    assert_eq!(third.title, "db [7]");
    assert_eq!(tree.base_id("annotation:met.db[2]"), "annotation:met.db");
    assert_eq!(tree.base_id("basic:model_id"), "basic:model_id");
}

#[test]
fn param_lookup() {
    let tree = parse(&sample()).unwrap();

    let p = tree.param("annotation:met.db", 1).unwrap();
    assert_eq!(p.id, "annotation:met.db[1]");
    assert!(tree.param("annotation:met.db", 3).is_none());

    // A plain leaf answers index 0 with itself.
    let plain = tree.param("basic:model_id", 0).unwrap();
    assert_eq!(plain.id, "basic:model_id");
    assert!(tree.param("basic:model_id", 1).is_none());
    assert!(tree.param("basic", 0).is_none());
    assert!(tree.param("missing", 0).is_none());
}

#[test]
fn declared_empty_section_has_no_children() {
    let tree = parse(&sample()).unwrap();
    let empty = tree.get("empty").unwrap();
    assert_eq!(empty.kind, NodeKind::Section);
    assert!(empty.children.is_empty());
    assert_eq!(empty.title, "Nothing here");
}

#[test]
fn preorder_visits_parents_first() {
    let tree = parse(&sample()).unwrap();
    let order = tree.preorder();
    assert_eq!(order.len(), tree.len());
    assert_eq!(order[0], 0);
    let pos = |id: &str| order.iter().position(|&n| n == tree.lookup(id).unwrap()).unwrap();
    assert!(pos("basic") < pos("basic:model_id"));
    assert!(pos("basic:model_id") < pos("basic:metabolites"));
    assert!(pos("basic:metabolites") < pos("consistency"));
    assert!(pos("annotation:met.db") < pos("annotation:met.db[0]"));

    let up = tree.bottom_up();
    let up_pos = |id: &str| up.iter().position(|&n| n == tree.lookup(id).unwrap()).unwrap();
    assert!(up_pos("annotation:met.db[0]") < up_pos("annotation:met.db"));
    assert!(up_pos("annotation") < up_pos(""));
    assert_eq!(tree.depth(tree.lookup("annotation:met.db[0]").unwrap()), 4);
}

#[test]
fn section_tests_are_collected() {
    let doc = json!({
        "tests": {},
        "sections": {
            "basic": {
                "title": "Basic",
                "tests": {"basic:a": {"outcome": true}},
                "sections": {
                    "basic:deep": {"tests": {"basic:deep.b": {"outcome": false}}}
                }
            }
        }
    });
    let tree = parse(&doc).unwrap();
    assert!(tree.get("basic:a").is_some());
    assert_eq!(
        tree.get("basic:deep.b").unwrap().parent,
        tree.lookup("basic:deep")
    );
}

#[test]
fn score_block_sets_weights_and_rules() {
    let doc = json!({
        "tests": {
            "a:x": {"type": "check", "outcome": true, "weight": 2.0},
            "a:y": {"value": 12.0}
        },
        "score": {
            "weights": {"a": 3.0, "a:x": 5.0, "unknown": 1.0},
            "metrics": {"a:y": {"direction": "higher_is_better", "min": 10, "max": 20}}
        }
    });
    let tree = parse(&doc).unwrap();
    assert_eq!(tree.get("a").unwrap().weight, Some(3.0));
    assert_eq!(tree.get("a:x").unwrap().weight, Some(5.0));
    let y = tree.get("a:y").unwrap();
    assert_eq!(y.kind, NodeKind::Metric);
    assert_eq!(
        y.scoring,
        Some(ScoringRule::Linear {
            direction: Direction::HigherIsBetter,
            min: 10.0,
            max: 20.0
        })
    );
}

#[test]
fn curve_rule_parses() {
    let doc = json!({
        "tests": {
            "m": {"type": "metric", "value": 3, "curve": [[0, 1.0], [5, 0.5], [10, 0.0]]}
        }
    });
    let tree = parse(&doc).unwrap();
    match &tree.get("m").unwrap().scoring {
        Some(ScoringRule::Curve { direction, points }) => {
            assert_eq!(*direction, Direction::LowerIsBetter);
            assert_eq!(points.len(), 3);
            assert_eq!(points[1], Breakpoint { input: 5.0, score: 0.5 });
        }
        other => panic!("expected curve, got {other:?}"),
    }
}

#[test]
fn history_is_parsed() {
    let doc = json!({
        "tests": {"a": {"type": "metric", "value": 0.1}},
        "history": {
            "a": [
                {"commit": "abc", "branch": "main", "metric": 0.2, "data": 4,
                 "time": "2024-05-01T10:00:00+02:00"},
                {"commit": 42, "metric": null}
            ]
        }
    });
    let tree = parse(&doc).unwrap();
    let h = tree.history("a").unwrap();
    assert_eq!(h.len(), 2);
    assert_eq!(h[0].commit, "abc");
    assert_eq!(h[0].branch, "main");
    assert_eq!(h[0].metric, Some(0.2));
    assert_eq!(h[0].data, Some(4.0));
    assert!(h[0].time.is_some());
    assert_eq!(h[1].commit, "42");
    assert_eq!(h[1].branch, "");
    assert_eq!(h[1].metric, None);
    assert!(tree.history("b").is_none());
}

// --- malformed documents ---

fn reason(doc: serde_json::Value) -> String {
    parse(&doc).unwrap_err().to_string()
}

#[test]
fn rejects_non_object_document() {
    assert!(reason(json!([1, 2])).contains("must be a JSON object"));
}

#[test]
fn rejects_missing_tests() {
    assert!(reason(json!({"title": "x"})).contains("missing required `tests`"));
}

#[test]
fn rejects_non_object_tests() {
    assert!(reason(json!({"tests": []})).contains("`tests` must be an object"));
}

#[test]
fn rejects_non_object_leaf_record() {
    assert!(reason(json!({"tests": {"a": true}})).contains("test record must be an object"));
}

#[test]
fn rejects_boolean_metric_and_numeric_check() {
    let r = reason(json!({"tests": {"a": {"type": "metric", "value": true}}}));
    assert!(r.contains("metric value must be a number"), "got {r}");
    let r = reason(json!({"tests": {"a": {"type": "check", "outcome": 1}}}));
    assert!(r.contains("check outcome must be"), "got {r}");
}

#[test]
fn rejects_missing_value() {
    let r = reason(json!({"tests": {"a": {"type": "metric"}}}));
    assert!(r.contains("missing `value`"), "got {r}");
}

#[test]
fn rejects_duplicate_identifier_across_bodies() {
    let r = reason(json!({
        "tests": {"a:x": {"outcome": true}},
        "sections": {"a": {"tests": {"a:x": {"outcome": false}}}}
    }));
    assert!(r.contains("duplicate test identifier"), "got {r}");
}

#[test]
fn rejects_leaf_that_is_also_a_section() {
    let r = reason(json!({"tests": {"a:x": {"outcome": true}, "a:x.y": {"outcome": true}}}));
    assert!(r.contains("both a test and a section"), "got {r}");
    let r = reason(json!({"tests": {"a:x.y": {"outcome": true}, "a:x": {"outcome": true}}}));
    assert!(r.contains("both a test and a section"), "got {r}");
}

#[test]
fn rejects_test_outside_its_section() {
    let r = reason(json!({
        "tests": {},
        "sections": {"a": {"tests": {"b:x": {"outcome": true}}}}
    }));
    assert!(r.contains("outside its section"), "got {r}");
}

#[test]
fn rejects_bad_identifiers() {
    assert!(reason(json!({"tests": {"a::b": {"outcome": true}}})).contains("empty segment"));
    assert!(reason(json!({"tests": {"a[0]": {"outcome": true}}})).contains("reserved"));
}

#[test]
fn rejects_reserved_total_identifier() {
    let r = reason(json!({"tests": {"total": {"outcome": true}}}));
    assert!(r.contains("reserved for the overall score history"), "got {r}");

    let r = reason(json!({"tests": {"total:x": {"outcome": true}}}));
    assert!(r.contains("reserved"), "got {r}");

    let r = reason(json!({"tests": {}, "sections": {"total": {"tests": {}}}}));
    assert!(r.contains("reserved"), "got {r}");

    // Only a whole first segment is reserved.
    assert!(parse(&json!({"tests": {"totals": {"outcome": true}, "a:total": {"outcome": true}}})).is_ok());
}

#[test]
fn rejects_param_length_mismatch() {
    let r = reason(json!({"tests": {"a": {"type": "metric", "params": ["x", "y"], "value": [0.1]}}}));
    assert!(r.contains("array of 2 entries"), "got {r}");
}

#[test]
fn rejects_empty_domain_and_bad_curves() {
    let r = reason(json!({"tests": {"a": {"type": "metric", "value": 1, "min": 2, "max": 2}}}));
    assert!(r.contains("domain is empty"), "got {r}");

    let r = reason(json!({"tests": {"a": {"type": "metric", "value": 1, "min": -1e308, "max": 1e308}}}));
    assert!(r.contains("domain is too wide"), "got {r}");

    let r = reason(json!({"tests": {"a": {"type": "metric", "value": 1, "curve": [[0, 0.0], [1, 1.0]]}}}));
    assert!(r.contains("follow the metric direction"), "got {r}");

    let r = reason(json!({"tests": {"a": {"type": "metric", "value": 1, "curve": [[1, 1.0], [0, 0.0]]}}}));
    assert!(r.contains("strictly ascending"), "got {r}");

    let r = reason(json!({"tests": {"a": {"type": "metric", "value": 1, "curve": [[0, 2.0]]}}}));
    assert!(r.contains("[0, 1]"), "got {r}");
}

#[test]
fn rejects_non_numeric_weight() {
    let r = reason(json!({"tests": {"a": {"outcome": true, "weight": "heavy"}}}));
    assert!(r.contains("`weight` must be a number"), "got {r}");
}

#[test]
fn rejects_runaway_section_nesting() {
    let mut body = json!({});
    let mut id = String::from("s");
    let mut ids = vec![id.clone()];
    for _ in 0..70 {
        id.push_str(".s");
        ids.push(id.clone());
    }
    for id in ids.iter().rev() {
        let mut sections = serde_json::Map::new();
        sections.insert(id.clone(), body);
        body = json!({ "sections": sections });
    }
    body["tests"] = json!({});
    let r = reason(body);
    assert!(r.contains("nested deeper"), "got {r}");
}

#[test]
fn rejects_malformed_history() {
    let r = reason(json!({"tests": {}, "history": {"a": [{"branch": "main"}]}}));
    assert!(r.contains("needs a `commit`"), "got {r}");
    let r = reason(json!({"tests": {}, "history": {"a": [{"commit": "x", "time": "yesterday"}]}}));
    assert!(r.contains("RFC 3339"), "got {r}");
}

// --- identifier helpers ---

#[test]
fn namespace_helpers() {
    assert_eq!(namespace_prefixes("a:b.c"), vec!["a", "a:b"]);
    assert!(namespace_prefixes("plain").is_empty());
    assert_eq!(last_segment("a:b.c"), "c");
    assert_eq!(last_segment("plain"), "plain");
    assert!(is_within("a:b", "a"));
    assert!(is_within("a.b", "a"));
    assert!(!is_within("ab", "a"));
    assert!(!is_within("a", "a"));
    assert!(is_within("anything", ""));
    assert_eq!(param_id("a:b", 3), "a:b[3]");
}
