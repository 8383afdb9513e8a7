use super::*;

#[test]
fn separator_width() {
    let s = separator(5);
    // Each ─ is 3 bytes in UTF-8
    assert_eq!(s.chars().count(), 5);
}

#[test]
fn print_json_stdout_works() {
    let data = vec![1, 2, 3];
    print_json_stdout(&data).unwrap();
}

#[test]
fn fit_width_pads_short_text() {
    assert_eq!(fit_width("abc", 6), "abc   ");
    assert_eq!(fit_width("", 2), "  ");
}

#[test]
fn fit_width_truncates_long_text() {
    let s = fit_width("stoichiometry", 6);
    assert_eq!(s, "stoic…");
    assert_eq!(s.width(), 6);
}

#[test]
fn fit_width_counts_wide_chars() {
    // Each CJK char takes two columns.
    let s = fit_width("代謝", 6);
    assert_eq!(s.width(), 6);
    assert!(s.starts_with("代謝"));

    let s = fit_width("代謝モデル", 5);
    assert_eq!(s.width(), 5);
    assert!(s.ends_with('…'));
}

#[test]
fn format_percent_values() {
    assert_eq!(format_percent(Some(0.843)), "84.3%");
    assert_eq!(format_percent(Some(1.0)), "100.0%");
    assert_eq!(format_percent(None), "-");
}

#[test]
fn display_id_labels_root() {
    assert_eq!(display_id(""), "(total)");
    assert_eq!(display_id("basic:x"), "basic:x");
}
