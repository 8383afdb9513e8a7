//! Long help text constants for CLI subcommands.

/// Scored tree: how leaves become scores and how sections combine them.
pub const SCORE: &str = "\
Score a test report and print the result tree.

Every leaf test gets a score in [0, 1]:
  check   1.0 when it passed, 0.0 otherwise (failed, skipped, errored)
  metric  normalized from its raw value by its scoring rule:
            linear  lower_is_better: (max - v) / (max - min)
                    higher_is_better: (v - min) / (max - min)
            curve   piecewise-linear between [input, score] breakpoints
          clamped into [0, 1]. Default rule: lower_is_better on [0, 1].

Sections and parameterized tests take the weighted mean of their children
with a defined score. An empty section has no score and is left out of its
parent rather than counted as zero.

With --reference, a Delta column shows the change in percentage points.";

/// Diff between two reports.
pub const DIFF: &str = "\
Compare a report against a reference report, identifier by identifier.

Status per identifier:
  improved   current score above reference by more than epsilon
  regressed  current score below reference by more than epsilon
  unchanged  within epsilon, or either score undefined
  added      only in the current report
  removed    only in the reference report

Rows follow the current report's tree order; removed identifiers are
listed after it, grouped under their nearest surviving section.

Epsilon defaults to [diff] epsilon in suitescore.toml (0 when unset).";

/// History series of one test.
pub const HISTORY: &str = "\
Show the recorded history of one test across commits and branches.

Metric tests are shown as score (1 - metric), so a rising series means
an improving test. Checks and other tests show their recorded data value.
Without an identifier, the overall report score history is shown.";
