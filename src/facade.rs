//! Single entry point for consumers of a loaded report.
//!
//! `ReportData` owns the current report, an optional reference report and
//! the diff between them. Every load runs fetch, parse, aggregate and diff
//! to completion, then swaps in a new state in one step; a failure at any
//! stage leaves the previous state untouched.
//!
//! Loads can be split into `begin_load` and `complete_load` so callers that
//! fetch asynchronously get last-request-wins: only the most recently begun
//! load of a slot is ever applied.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::classify;
use crate::config::Settings;
use crate::diff::{DiffEntry, diff};
use crate::error::{LoadError, ReportError};
use crate::history::{self, DisplayField, HistorySeries, TOTAL_KEY};
use crate::model;
use crate::score::{ScoredNode, ScoredTree, aggregate};
use crate::source::ReportSource;

/// Which report a load replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Current,
    Reference,
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Reference => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Reference => "reference",
        }
    }
}

/// Handle for one in-flight load, issued by [`ReportData::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    slot: Slot,
    generation: u64,
}

impl LoadTicket {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The report replaced the slot's previous one.
    Applied,
    /// A newer load of the same slot was begun; this one was dropped.
    Superseded,
}

/// A parsed and scored report, shared read-only with consumers.
#[derive(Debug)]
pub struct LoadedReport {
    origin: String,
    scored: ScoredTree,
}

impl LoadedReport {
    /// Where the report was loaded from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn scored(&self) -> &ScoredTree {
        &self.scored
    }
}

#[derive(Debug, Default)]
struct ReportState {
    current: Option<Arc<LoadedReport>>,
    reference: Option<Arc<LoadedReport>>,
    diff: Vec<DiffEntry>,
}

pub struct ReportData {
    settings: Settings,
    state: Arc<ReportState>,
    issued: [u64; 2],
}

impl ReportData {
    /// Empty facade; queries answer `None` or empty until a load succeeds.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: Arc::new(ReportState::default()),
            issued: [0; 2],
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fetch and apply a report into the current slot.
    pub fn load_report(&mut self, source: &dyn ReportSource) -> Result<LoadOutcome, ReportError> {
        self.load(Slot::Current, source)
    }

    /// Fetch and apply a report to compare the current one against.
    pub fn load_reference(
        &mut self,
        source: &dyn ReportSource,
    ) -> Result<LoadOutcome, ReportError> {
        self.load(Slot::Reference, source)
    }

    fn load(&mut self, slot: Slot, source: &dyn ReportSource) -> Result<LoadOutcome, ReportError> {
        let ticket = self.begin_load(slot);
        let origin = source.describe();
        self.complete_load(ticket, &origin, source.fetch())
    }

    /// Drop the reference report and the diff. Reference loads still in
    /// flight are superseded.
    pub fn clear_reference(&mut self) {
        self.issued[Slot::Reference.index()] += 1;
        self.state = Arc::new(ReportState {
            current: self.state.current.clone(),
            reference: None,
            diff: Vec::new(),
        });
        debug!("reference report cleared");
    }

    /// Start a load of `slot`. Any earlier ticket for the slot becomes stale.
    pub fn begin_load(&mut self, slot: Slot) -> LoadTicket {
        let counter = &mut self.issued[slot.index()];
        *counter += 1;
        LoadTicket {
            slot,
            generation: *counter,
        }
    }

    /// Finish a load begun with [`begin_load`](Self::begin_load).
    ///
    /// `fetched` is the outcome of fetching the document from `origin`.
    /// A stale ticket is reported as `Superseded` and changes nothing,
    /// whatever its fetch produced.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        origin: &str,
        fetched: Result<Value, LoadError>,
    ) -> Result<LoadOutcome, ReportError> {
        let latest = self.issued[ticket.slot.index()];
        if ticket.generation != latest {
            warn!(
                slot = ticket.slot.as_str(),
                origin,
                ticket = ticket.generation,
                latest,
                "superseded load discarded"
            );
            return Ok(LoadOutcome::Superseded);
        }

        let doc = fetched?;
        let scored = aggregate(model::parse(&doc)?)?;
        info!(
            slot = ticket.slot.as_str(),
            origin,
            nodes = scored.tree().len(),
            total = ?scored.total(),
            "report loaded"
        );

        let report = Some(Arc::new(LoadedReport {
            origin: origin.to_string(),
            scored,
        }));
        let (current, reference) = match ticket.slot {
            Slot::Current => (report, self.state.reference.clone()),
            Slot::Reference => (self.state.current.clone(), report),
        };
        let diff = match (&current, &reference) {
            (Some(c), Some(r)) => diff(&c.scored, &r.scored, self.settings.diff.epsilon),
            _ => Vec::new(),
        };
        self.state = Arc::new(ReportState {
            current,
            reference,
            diff,
        });
        Ok(LoadOutcome::Applied)
    }

    fn current(&self) -> Option<&ScoredTree> {
        self.state.current.as_deref().map(LoadedReport::scored)
    }

    /// Scored node of the current report.
    pub fn get_node(&self, id: &str) -> Option<ScoredNode<'_>> {
        self.current()?.get(id)
    }

    /// Leaf `index` of a parameterized test; index 0 of a plain test is
    /// the test itself.
    pub fn get_param(&self, id: &str, index: usize) -> Option<ScoredNode<'_>> {
        let scored = self.current()?;
        let leaf = scored.tree().param(id, index)?;
        scored.get(&leaf.id)
    }

    /// Whether `id` is a metric. Synthetic parameter ids answer for their
    /// test; unknown ids and sections are not scored.
    pub fn is_scored(&self, id: &str) -> bool {
        self.current()
            .and_then(|s| {
                let tree = s.tree();
                tree.get(tree.base_id(id))
            })
            .is_some_and(classify::is_scored)
    }

    /// Diff of the current report against the reference; empty without one.
    pub fn get_diff(&self) -> &[DiffEntry] {
        &self.state.diff
    }

    /// Display series of one identifier. `total` gives the overall score.
    pub fn get_history(&self, id: &str) -> HistorySeries {
        if id == TOTAL_KEY {
            return self.total_history();
        }
        let scored = self.is_scored(id);
        match self.current().and_then(|s| s.tree().history(id)) {
            Some(raw) => history::normalize(id, raw, scored),
            None => HistorySeries::empty(id, display_field(scored)),
        }
    }

    /// Overall-score history of the current report.
    pub fn total_history(&self) -> HistorySeries {
        match self.current().and_then(|s| s.tree().history(TOTAL_KEY)) {
            Some(raw) => history::total_series(raw),
            None => HistorySeries::empty(TOTAL_KEY, DisplayField::Metric),
        }
    }

    /// The current report, kept alive for as long as the caller holds it.
    pub fn snapshot(&self) -> Option<Arc<LoadedReport>> {
        self.state.current.clone()
    }

    pub fn reference_snapshot(&self) -> Option<Arc<LoadedReport>> {
        self.state.reference.clone()
    }
}

fn display_field(scored: bool) -> DisplayField {
    if scored {
        DisplayField::Metric
    } else {
        DisplayField::Data
    }
}

#[cfg(test)]
#[path = "facade_test.rs"]
mod tests;
