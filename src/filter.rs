//! Row cleaning applied between loading and dispatch.
//!
//! Only rows pointing at an `http`/`https` URL survive, and their event ids are
//! prefixed so they can double as file base names.

use crate::models::EventRow;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};

/// Prefix prepended to every event id so that no file name starts with a digit.
pub const DEFAULT_ID_PREFIX: &str = "ID";

static HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^http.*").expect("valid regex"));

/// Whether a source URL survives cleaning (case-sensitive, anchored at start).
pub fn is_http_url(url: &str) -> bool {
    HTTP_URL.is_match(url)
}

/// Keep the `http(s)` rows and prefix their event ids, preserving input order.
#[instrument(level = "info", skip(rows), fields(input = rows.len()))]
pub fn clean_events(rows: Vec<EventRow>, id_prefix: &str) -> Vec<EventRow> {
    let total = rows.len();
    let cleaned: Vec<EventRow> = rows
        .into_iter()
        .filter(|row| {
            let keep = is_http_url(&row.source_url);
            if !keep {
                debug!(event_id = %row.event_id, url = %row.source_url, "Dropping non-http row");
            }
            keep
        })
        .map(|row| EventRow::new(format!("{id_prefix}{}", row.event_id), row.source_url))
        .collect();

    info!(
        kept = cleaned.len(),
        dropped = total - cleaned.len(),
        "Cleaned GDELT events"
    );
    cleaned
}

/// Truncate to the first `limit` rows when a limit is configured.
pub fn limit_rows(mut rows: Vec<EventRow>, limit: Option<usize>) -> Vec<EventRow> {
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
