//! Error taxonomy for report loading and scoring.
//!
//! Each failure class is its own type so callers can match on exactly
//! what went wrong; `ReportError` wraps them for the facade and the CLI.

use std::path::PathBuf;

/// Structural violation found while parsing a report document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed report{}: {reason}", .id.as_deref().map(|i| format!(" at `{i}`")).unwrap_or_default())]
pub struct MalformedReportError {
    /// Identifier the violation was found at, when there is one.
    pub id: Option<String>,
    pub reason: String,
}

impl MalformedReportError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            id: None,
            reason: reason.into(),
        }
    }

    pub fn at(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            reason: reason.into(),
        }
    }
}

/// A declared weight was negative. Zero is valid; negative never is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid weight {weight} for `{id}` (weights must be >= 0)")]
pub struct MissingWeightError {
    pub id: String,
    pub weight: f64,
}

/// Transport-level failure while fetching a report.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Local file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("request to {url} returned {status}")]
    Status { url: String, status: u16 },

    /// Payload is not JSON at all.
    #[error("{origin} is not valid JSON: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration file problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Any failure surfaced by the facade.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Malformed(#[from] MalformedReportError),

    #[error(transparent)]
    MissingWeight(#[from] MissingWeightError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReportError {
    /// Transport failures are worth retrying; structural ones are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Short message suitable for an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "report could not be read",
            Self::MissingWeight(_) => "report declares an invalid score weight",
            Self::Load(_) => "report could not be loaded, try again",
            Self::Config(_) => "configuration is invalid",
        }
    }
}
