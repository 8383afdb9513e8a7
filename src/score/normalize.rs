//! Raw metric value to score in [0, 1].
//!
//! A metric declares either a linear domain `[min, max]` or a piecewise
//! linear curve of breakpoints. Values between breakpoints are linearly
//! interpolated; values beyond the endpoints are clamped. Every result is
//! clamped into [0, 1], whatever the raw value.

use crate::model::{Breakpoint, Direction, ScoringRule};

/// Score a metric value according to its rule.
pub fn normalize_metric(value: f64, rule: &ScoringRule) -> f64 {
    let score = match rule {
        ScoringRule::Linear {
            direction,
            min,
            max,
        } => linear(value, *direction, *min, *max),
        ScoringRule::Curve { points, .. } => piecewise(value, points),
    };
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Works on halved operands so a domain spanning most of the `f64` range
/// stays finite.
fn linear(value: f64, direction: Direction, min: f64, max: f64) -> f64 {
    let (value, min, max) = (value / 2.0, min / 2.0, max / 2.0);
    let span = max - min;
    match direction {
        Direction::HigherIsBetter => (value - min) / span,
        Direction::LowerIsBetter => (max - value) / span,
    }
}

/// Piecewise linear interpolation. Values below the first breakpoint clamp
/// to its score; values above the last clamp to its score.
fn piecewise(value: f64, curve: &[Breakpoint]) -> f64 {
    debug_assert!(
        curve.windows(2).all(|w| w[0].input <= w[1].input),
        "Breakpoints must be sorted by input in ascending order"
    );
    let Some(first) = curve.first() else {
        return 0.0;
    };
    if value <= first.input {
        return first.score;
    }
    for w in curve.windows(2) {
        if value <= w[1].input {
            let frac = (value - w[0].input) / (w[1].input - w[0].input);
            return w[0].score + frac * (w[1].score - w[0].score);
        }
    }
    curve.last().map_or(0.0, |b| b.score)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
