//! Data models for GDELT event rows, extracted articles and run outcomes.
//!
//! This module defines the core data structures used throughout the application:
//! - [`EventRow`]: One `(globaleventid, sourceurl)` pair read from the GDELT export
//! - [`ArticleRecord`]: The text and publication date recovered for one row
//! - [`RowOutcome`] / [`SkipReason`]: What happened to a single row
//! - [`PartitionReport`] / [`RunSummary`]: Aggregated results of a dispatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// A single GDELT event reference as read from the input CSV.
///
/// Columns are matched by header name, so any extra columns in the export are
/// ignored. An empty `sourceurl` cell deserializes to an empty string and is
/// dropped later by the row filter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRow {
    /// The GDELT event identifier (prefixed once the row has been cleaned).
    #[serde(rename = "globaleventid")]
    pub event_id: String,
    /// The URL of the article that reported the event.
    #[serde(rename = "sourceurl", default)]
    pub source_url: String,
}

impl EventRow {
    pub fn new(event_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            source_url: source_url.into(),
        }
    }

    /// Base name of the text file this row is written to.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.event_id)
    }
}

/// The article recovered for one [`EventRow`].
///
/// Never stored as a structured entity; it only lives long enough to be
/// rendered into `<event_id>.txt`.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    pub event_id: String,
    /// Best-effort publication date. `None` is written as the literal `None`.
    pub publish_date: Option<DateTime<Utc>>,
    pub body_text: String,
}

impl ArticleRecord {
    /// Publication date as written to the output file.
    pub fn publish_date_label(&self) -> String {
        match self.publish_date {
            Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "None".to_string(),
        }
    }

    /// Full contents of the output file, including the trailing newline.
    pub fn render(&self) -> String {
        format!(
            "publication date: {}\n{}\n",
            self.publish_date_label(),
            self.body_text
        )
    }
}

/// Why a row produced no output file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("event id {0:?} is not a valid file name")]
    InvalidFileName(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Network(String),
    #[error("server answered with HTTP {0}")]
    HttpStatus(u16),
    #[error("could not extract article: {0}")]
    Extraction(String),
    #[error("could not write article file: {0}")]
    Write(String),
}

impl SkipReason {
    /// Short stable label used as a key in [`RunSummary::skip_counts`].
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::InvalidFileName(_) => "invalid_file_name",
            SkipReason::Timeout(_) => "timeout",
            SkipReason::Network(_) => "network",
            SkipReason::HttpStatus(_) => "http_status",
            SkipReason::Extraction(_) => "extraction",
            SkipReason::Write(_) => "write",
        }
    }
}

/// Result of processing a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Written { event_id: String, path: PathBuf },
    Skipped { event_id: String, reason: SkipReason },
}

impl RowOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, RowOutcome::Written { .. })
    }
}

/// Outcomes of one partition, in the order its rows were processed.
#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub index: usize,
    pub outcomes: Vec<RowOutcome>,
}

/// Aggregated counts for a whole dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of partitions the rows were split into.
    pub partitions: usize,
    /// Rows handed to the dispatcher.
    pub rows: usize,
    pub written: usize,
    pub skipped: usize,
    /// Partitions whose task died before reporting.
    pub failed_partitions: usize,
    /// Skipped rows keyed by [`SkipReason::kind`].
    pub skip_counts: BTreeMap<String, usize>,
}

impl RunSummary {
    /// Single-line JSON form, used for the end-of-run log record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Fold a partition's outcomes into the summary.
    pub fn absorb(&mut self, report: &PartitionReport) {
        for outcome in &report.outcomes {
            match outcome {
                RowOutcome::Written { .. } => self.written += 1,
                RowOutcome::Skipped { reason, .. } => {
                    self.skipped += 1;
                    *self.skip_counts.entry(reason.kind().to_string()).or_default() += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_run_summary_json() {
        let mut summary = RunSummary {
            partitions: 2,
            rows: 3,
            ..RunSummary::default()
        };
        summary.absorb(&PartitionReport {
            index: 0,
            outcomes: vec![
                RowOutcome::Written {
                    event_id: "ID1".to_string(),
                    path: "ID1.txt".into(),
                },
                RowOutcome::Skipped {
                    event_id: "ID2".to_string(),
                    reason: SkipReason::HttpStatus(404),
                },
            ],
        });

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["written"], 1);
        assert_eq!(json["skipped"], 1);
        assert_eq!(json["skip_counts"]["http_status"], 1);
        assert_eq!(json["failed_partitions"], 0);
    }

    #[test]
    fn test_event_row_file_name() {
        let row = EventRow::new("ID812345", "https://example.com/a");
        assert_eq!(row.file_name(), "ID812345.txt");
    }

    #[test]
    fn test_render_with_date() {
        let record = ArticleRecord {
            event_id: "ID1".to_string(),
            publish_date: Some(Utc.with_ymd_and_hms(2019, 3, 1, 14, 5, 0).unwrap()),
            body_text: "First paragraph.\n\nSecond paragraph.".to_string(),
        };
        assert_eq!(
            record.render(),
            "publication date: 2019-03-01 14:05:00\nFirst paragraph.\n\nSecond paragraph.\n"
        );
    }

    #[test]
    fn test_render_without_date_uses_literal_none() {
        let record = ArticleRecord {
            event_id: "ID1".to_string(),
            publish_date: None,
            body_text: "Body".to_string(),
        };
        assert_eq!(record.render(), "publication date: None\nBody\n");
    }

    #[test]
    fn test_skip_reason_display_and_kind() {
        let reason = SkipReason::HttpStatus(404);
        assert_eq!(reason.to_string(), "server answered with HTTP 404");
        assert_eq!(reason.kind(), "http_status");
    }

    #[test]
    fn test_summary_absorb_counts_by_kind() {
        let report = PartitionReport {
            index: 0,
            outcomes: vec![
                RowOutcome::Written {
                    event_id: "ID1".to_string(),
                    path: PathBuf::from("ID1.txt"),
                },
                RowOutcome::Skipped {
                    event_id: "ID2".to_string(),
                    reason: SkipReason::HttpStatus(404),
                },
                RowOutcome::Skipped {
                    event_id: "ID3".to_string(),
                    reason: SkipReason::HttpStatus(500),
                },
            ],
        };
        let mut summary = RunSummary::default();
        summary.absorb(&report);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.skip_counts.get("http_status"), Some(&2));
    }
}
