use super::*;

fn entry(id: &str, current: Option<f64>, reference: Option<f64>, status: DiffStatus) -> DiffEntry {
    DiffEntry {
        id: id.to_string(),
        current,
        reference,
        delta: current.zip(reference).map(|(c, r)| c - r),
        status,
    }
}

fn sample_entries() -> Vec<DiffEntry> {
    vec![
        entry("", Some(0.84), Some(0.79), DiffStatus::Improved),
        entry("basic", Some(1.0), Some(1.0), DiffStatus::Unchanged),
        entry("consistency:mass_balance", Some(0.4), Some(0.6), DiffStatus::Regressed),
        entry("annotation:sbo", Some(0.9), None, DiffStatus::Added),
        entry("annotation:kegg", None, Some(0.2), DiffStatus::Removed),
    ]
}

#[test]
fn print_report_does_not_panic() {
    print_report(&sample_entries(), "main.json", false);
}

#[test]
fn print_report_changed_only() {
    print_report(&sample_entries(), "main.json", true);
}

#[test]
fn print_report_empty() {
    print_report(&[], "main.json", false);
}

#[test]
fn print_json_does_not_panic() {
    print_json(&sample_entries(), "pr.json", "main.json", true).unwrap();
}

#[test]
fn colored_delta_uses_status() {
    let e = entry("x", Some(0.5), Some(0.25), DiffStatus::Improved);
    let s = colored_delta(&e);
    assert!(s.contains(GREEN));
    assert!(s.contains("+25.0"));

    let e = entry("x", Some(0.25), Some(0.5), DiffStatus::Regressed);
    let s = colored_delta(&e);
    assert!(s.contains(RED));
    assert!(s.contains("-25.0"));

    // Within epsilon: shown as no change even though delta is non-zero.
    let e = entry("x", Some(0.501), Some(0.5), DiffStatus::Unchanged);
    assert!(colored_delta(&e).contains(YELLOW));
}

#[test]
fn colored_delta_without_scores() {
    let e = entry("x", Some(0.5), None, DiffStatus::Added);
    assert_eq!(colored_delta(&e).trim(), "-");
}
