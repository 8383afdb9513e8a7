use super::*;

fn lower(min: f64, max: f64) -> ScoringRule {
    ScoringRule::Linear {
        direction: Direction::LowerIsBetter,
        min,
        max,
    }
}

fn higher(min: f64, max: f64) -> ScoringRule {
    ScoringRule::Linear {
        direction: Direction::HigherIsBetter,
        min,
        max,
    }
}

fn curve(points: &[(f64, f64)], direction: Direction) -> ScoringRule {
    ScoringRule::Curve {
        direction,
        points: points
            .iter()
            .map(|&(input, score)| Breakpoint { input, score })
            .collect(),
    }
}

// --- linear ---

#[test]
fn lower_is_better_unit_domain() {
    let rule = lower(0.0, 1.0);
    assert!((normalize_metric(0.0, &rule) - 1.0).abs() < 1e-12);
    assert!((normalize_metric(0.25, &rule) - 0.75).abs() < 1e-12);
    assert!((normalize_metric(1.0, &rule) - 0.0).abs() < 1e-12);
}

#[test]
fn higher_is_better_custom_domain() {
    let rule = higher(10.0, 20.0);
    assert!((normalize_metric(10.0, &rule) - 0.0).abs() < 1e-12);
    assert!((normalize_metric(15.0, &rule) - 0.5).abs() < 1e-12);
    assert!((normalize_metric(20.0, &rule) - 1.0).abs() < 1e-12);
}

#[test]
fn values_outside_domain_are_clamped() {
    let rule = higher(10.0, 20.0);
    assert_eq!(normalize_metric(-50.0, &rule), 0.0);
    assert_eq!(normalize_metric(500.0, &rule), 1.0);

    let rule = lower(0.0, 1.0);
    assert_eq!(normalize_metric(3.0, &rule), 0.0);
    assert_eq!(normalize_metric(-3.0, &rule), 1.0);
}

#[test]
fn linear_is_monotonic_in_direction() {
    let values = [-1.0, 0.0, 0.1, 0.3, 0.5, 0.9, 1.0, 2.0];
    let up = higher(0.0, 1.0);
    let down = lower(0.0, 1.0);
    for w in values.windows(2) {
        assert!(normalize_metric(w[1], &up) >= normalize_metric(w[0], &up));
        assert!(normalize_metric(w[1], &down) <= normalize_metric(w[0], &down));
    }
}

#[test]
fn extreme_domain_stays_finite() {
    let up = higher(-1e308, 1e308);
    assert_eq!(normalize_metric(1e308, &up), 1.0);
    assert_eq!(normalize_metric(-1e308, &up), 0.0);
    assert_eq!(normalize_metric(0.0, &up), 0.5);

    let down = lower(-f64::MAX, f64::MAX);
    for v in [-f64::MAX, -1.0, 0.0, 1e300, f64::MAX] {
        let s = normalize_metric(v, &down);
        assert!(s.is_finite() && (0.0..=1.0).contains(&s), "{v} -> {s}");
    }
}

#[test]
fn undefined_result_scores_zero() {
    // A zero-width domain only arrives through a hand-built rule.
    assert_eq!(normalize_metric(1.0, &higher(1.0, 1.0)), 0.0);
}

// --- curves ---

#[test]
fn curve_interpolates_between_breakpoints() {
    let rule = curve(&[(4.0, 1.0), (9.0, 0.85), (14.0, 0.65)], Direction::LowerIsBetter);
    assert!((normalize_metric(4.0, &rule) - 1.0).abs() < 1e-12);
    assert!((normalize_metric(9.0, &rule) - 0.85).abs() < 1e-12);
    // 11.5 is halfway between 9 and 14
    assert!((normalize_metric(11.5, &rule) - 0.75).abs() < 1e-12);
}

#[test]
fn curve_clamps_beyond_endpoints() {
    let rule = curve(&[(4.0, 1.0), (100.0, 0.2)], Direction::LowerIsBetter);
    assert_eq!(normalize_metric(0.0, &rule), 1.0);
    assert_eq!(normalize_metric(1000.0, &rule), 0.2);
}

#[test]
fn single_point_curve_is_constant() {
    let rule = curve(&[(5.0, 0.4)], Direction::HigherIsBetter);
    assert_eq!(normalize_metric(-1.0, &rule), 0.4);
    assert_eq!(normalize_metric(99.0, &rule), 0.4);
}

#[test]
fn empty_curve_scores_zero() {
    let rule = curve(&[], Direction::HigherIsBetter);
    assert_eq!(normalize_metric(1.0, &rule), 0.0);
}

#[test]
fn default_rule_is_unit_lower_is_better() {
    let rule = ScoringRule::default();
    assert_eq!(rule.direction(), Direction::LowerIsBetter);
    assert!((normalize_metric(0.2, &rule) - 0.8).abs() < 1e-12);
}
