//! Result aggregation and scoring engine for model test reports.
//!
//! A report document is parsed into a [`model::ResultTree`], scored bottom-up
//! into a [`score::ScoredTree`], compared against a reference with
//! [`diff::diff`] and turned into display series by [`history::normalize`].
//! [`facade::ReportData`] ties these together behind one query API.

pub mod classify;
pub mod config;
pub mod diff;
pub mod error;
pub mod facade;
pub mod history;
pub mod model;
pub mod report_helpers;
pub mod score;
pub mod source;

pub use classify::TestClass;
pub use config::Settings;
pub use diff::{DiffEntry, DiffStatus, DiffSummary};
pub use error::{ConfigError, LoadError, MalformedReportError, MissingWeightError, ReportError};
pub use facade::{LoadOutcome, LoadTicket, LoadedReport, ReportData, Slot};
pub use history::{DisplayField, HistoryPoint, HistorySeries, SeriesPoint};
pub use model::{NodeId, NodeKind, ResultNode, ResultTree};
pub use score::{ScoredNode, ScoredTree};
pub use source::{FileSource, HttpSource, InlineSource, ReportSource};
