//! Core types and errors for the URL extractor.

use crate::normalize::ResultSet;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while retrieving or writing content.
#[derive(Error, Debug)]
pub enum UrlHarvestError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    StatusError { status: u16, url: String },

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Fetch failed: {0}")]
    FetchError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UrlHarvestError>;

/// Outcome of a best-effort parse.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ParseStatus {
    /// Parsed without diagnostics.
    Clean,
    /// Parsed with recoverable errors; the tree is partial.
    Degraded { errors: usize },
    /// Nothing usable came out of the parser.
    Failed,
}

impl ParseStatus {
    /// Status for a parse that finished with `errors` diagnostics.
    pub fn from_error_count(errors: usize) -> Self {
        if errors == 0 {
            ParseStatus::Clean
        } else {
            ParseStatus::Degraded { errors }
        }
    }
}

/// Where a script body came from.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScriptOrigin {
    /// Loaded through a `src` attribute.
    External { url: String },
    /// Embedded in the page; `index` counts inline scripts in document order.
    Inline { index: usize },
}

/// What happened to a single script during extraction.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum ScriptStatus {
    Parsed { parse: ParseStatus },
    FetchFailed { error: String },
    TooLarge,
}

/// Per-script diagnostics collected by the scanner.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRecord {
    pub origin: ScriptOrigin,
    /// Body size in bytes (0 when the fetch failed).
    pub bytes: usize,
    /// SHA256 of the body, hex encoded.
    pub content_hash: Option<String>,
    pub status: ScriptStatus,
    /// Candidates the syntax scanner produced (before normalization).
    pub candidates: usize,
}

/// Complete extraction result for one target page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Target URL that was scanned.
    pub target: String,
    /// Every normalized URL found on the page and in its scripts.
    pub urls: ResultSet,
    /// How well the markup parsed, `None` if the page was never retrieved.
    pub markup: Option<ParseStatus>,
    pub scripts: Vec<ScriptRecord>,
    /// Scan duration in seconds.
    pub duration_secs: f64,
    /// Non-fatal problems met along the way.
    pub errors: Vec<String>,
}

impl PageReport {
    pub(crate) fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            urls: ResultSet::new(),
            markup: None,
            scripts: Vec::new(),
            duration_secs: 0.0,
            errors: Vec::new(),
        }
    }

    /// Whether the page itself was retrieved.
    pub fn page_loaded(&self) -> bool {
        self.markup.is_some()
    }
}

/// Configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            user_agent: "Mozilla/5.0 (compatible; urlharvest/0.1)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_from_error_count() {
        assert_eq!(ParseStatus::from_error_count(0), ParseStatus::Clean);
        assert_eq!(
            ParseStatus::from_error_count(3),
            ParseStatus::Degraded { errors: 3 }
        );
    }

    #[test]
    fn test_script_record_serializes_tagged() {
        let record = ScriptRecord {
            origin: ScriptOrigin::External {
                url: "https://example.com/app.js".to_string(),
            },
            bytes: 0,
            content_hash: None,
            status: ScriptStatus::FetchFailed {
                error: "HTTP 404 from https://example.com/app.js".to_string(),
            },
            candidates: 0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["origin"]["kind"], "external");
        assert_eq!(json["status"]["result"], "fetch_failed");
    }
}
