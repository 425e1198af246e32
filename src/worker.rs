//! Fetch-extract-persist worker for one partition of event rows.
//!
//! Rows are processed strictly in order. Each row is fetched with the
//! partition's User-Agent, reduced to body text plus a publication date and
//! written to `<output_dir>/<event_id>.txt`. A page without any article
//! text counts as an extraction failure. A failing row is logged and
//! reported as [`RowOutcome::Skipped`]; it never stops the partition and is
//! never retried.

use crate::models::{ArticleRecord, EventRow, PartitionReport, RowOutcome, SkipReason};
use crate::outputs::text::{is_safe_file_name, write_article};
use crate::scrapers::{article, dates, user_agent};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Content types the article extractor can make sense of.
const TEXT_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];

/// Fetches and persists the rows of a single partition.
#[derive(Debug)]
pub struct PartitionWorker {
    index: usize,
    client: reqwest::Client,
    output_dir: PathBuf,
}

impl PartitionWorker {
    /// Build a worker whose requests all carry `user_agent` and give up after `timeout`.
    pub fn new(
        index: usize,
        user_agent: &str,
        timeout: Duration,
        output_dir: &Path,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            index,
            client,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Process every row in order and return their outcomes in the same order.
    #[instrument(level = "info", skip_all, fields(partition = self.index, rows = rows.len()))]
    pub async fn run(&self, rows: Vec<EventRow>) -> Vec<RowOutcome> {
        let outcomes: Vec<RowOutcome> = stream::iter(rows)
            .then(|row| async move { self.process_row(&row).await })
            .collect()
            .await;

        let written = outcomes.iter().filter(|o| o.is_written()).count();
        info!(
            written,
            skipped = outcomes.len() - written,
            "Partition finished"
        );
        outcomes
    }

    /// Fetch, extract and persist one row. Failures are logged, not propagated.
    pub async fn process_row(&self, row: &EventRow) -> RowOutcome {
        match self.fetch_and_persist(row).await {
            Ok(path) => RowOutcome::Written {
                event_id: row.event_id.clone(),
                path,
            },
            Err(reason) => {
                warn!(
                    partition = self.index,
                    event_id = %row.event_id,
                    url = %row.source_url,
                    kind = reason.kind(),
                    error = %reason,
                    "There was a problem"
                );
                RowOutcome::Skipped {
                    event_id: row.event_id.clone(),
                    reason,
                }
            }
        }
    }

    #[instrument(level = "debug", skip_all, fields(event_id = %row.event_id, url = %row.source_url))]
    async fn fetch_and_persist(&self, row: &EventRow) -> Result<PathBuf, SkipReason> {
        if !is_safe_file_name(&row.file_name()) {
            return Err(SkipReason::InvalidFileName(row.event_id.clone()));
        }

        let t0 = Instant::now();
        let html = self.fetch_html(&row.source_url).await?;
        debug!(
            bytes = html.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched article HTML"
        );

        let record = ArticleRecord {
            event_id: row.event_id.clone(),
            publish_date: dates::extract_published_date(&html, Some(row.source_url.as_str())),
            body_text: article::extract_fulltext(&html),
        };
        if record.body_text.trim().is_empty() {
            return Err(SkipReason::Extraction("no article text found".to_string()));
        }
        debug!(
            publish_date = %record.publish_date_label(),
            preview = %truncate_for_log(&record.body_text, 120),
            "Extracted article"
        );

        let path = write_article(&self.output_dir, &record)
            .await
            .map_err(|e| SkipReason::Write(e.to_string()))?;
        info!(event_id = %row.event_id, path = %path.display(), "Saved article text");
        Ok(path)
    }

    async fn fetch_html(&self, url: &str) -> Result<String, SkipReason> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkipReason::HttpStatus(status.as_u16()));
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let content_type = content_type.to_ascii_lowercase();
            if !TEXT_CONTENT_TYPES
                .iter()
                .any(|accepted| content_type.starts_with(accepted))
            {
                return Err(SkipReason::Extraction(format!(
                    "unsupported content type {content_type}"
                )));
            }
        }

        response.text().await.map_err(classify_request_error)
    }
}

fn classify_request_error(err: reqwest::Error) -> SkipReason {
    if err.is_timeout() {
        SkipReason::Timeout(err.to_string())
    } else {
        SkipReason::Network(err.to_string())
    }
}

/// Run one partition end to end with a freshly drawn desktop User-Agent.
///
/// If the HTTP client cannot be built every row is reported as skipped, so
/// the partition still accounts for all of its rows.
pub async fn run_partition(
    index: usize,
    rows: Vec<EventRow>,
    output_dir: PathBuf,
    timeout: Duration,
) -> PartitionReport {
    let user_agent = user_agent::random_desktop_user_agent();
    debug!(partition = index, %user_agent, "Partition user agent");

    let outcomes = match PartitionWorker::new(index, &user_agent, timeout, &output_dir) {
        Ok(worker) => worker.run(rows).await,
        Err(e) => {
            warn!(partition = index, error = %e, "Could not build HTTP client; skipping partition rows");
            rows.into_iter()
                .map(|row| RowOutcome::Skipped {
                    event_id: row.event_id,
                    reason: SkipReason::Network(e.to_string()),
                })
                .collect()
        }
    };

    PartitionReport { index, outcomes }
}
