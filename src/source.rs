//! Where report documents come from.
//!
//! A source only fetches and decodes JSON. Structure is checked later by
//! the parser, so a source never returns a `MalformedReportError`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::FetchSettings;
use crate::error::LoadError;

/// Something that can produce a raw report document.
pub trait ReportSource {
    /// Human-readable origin, used in logs and error messages.
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<Value, LoadError>;
}

/// Report stored in a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Value, LoadError> {
        let bytes = std::fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "read report file");
        decode(&bytes, &self.describe())
    }
}

/// Report served over HTTP(S), fetched with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl ReportSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Value, LoadError> {
        let http_err = |source| LoadError::Http {
            url: self.url.clone(),
            source,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(http_err)?;
        let resp = client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes().map_err(http_err)?;
        debug!(url = %self.url, bytes = bytes.len(), "fetched report");
        decode(&bytes, &self.url)
    }
}

/// Report already held in memory, e.g. embedded in a page or a test.
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    body: Vec<u8>,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Inline source holding an already-built JSON value.
    pub fn from_value(name: impl Into<String>, value: &Value) -> Self {
        Self::new(name, value.to_string())
    }
}

impl ReportSource for InlineSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn fetch(&self) -> Result<Value, LoadError> {
        decode(&self.body, &self.name)
    }
}

fn decode(bytes: &[u8], origin: &str) -> Result<Value, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Decode {
        origin: origin.to_string(),
        source,
    })
}

/// Pick a source for a command-line location: URLs go over HTTP,
/// anything else is a file path.
pub fn open(location: &str, fetch: &FetchSettings) -> Box<dyn ReportSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location, fetch.timeout()))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
