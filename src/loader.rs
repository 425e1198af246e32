//! Input loading for GDELT CSV exports.
//!
//! The export must carry a header row with at least the `globaleventid` and
//! `sourceurl` columns; everything else in the file is ignored.

use crate::models::EventRow;
use itertools::Itertools;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 2] = ["globaleventid", "sourceurl"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open input file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input file {} has no `{column}` column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Load every event row from a GDELT CSV export.
///
/// # Errors
///
/// Fails if the file cannot be opened, lacks a required column, or contains a
/// record that cannot be parsed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_events(path: &Path) -> Result<Vec<EventRow>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    debug!(headers = ?headers, "Read CSV header");

    let rows = reader
        .deserialize::<EventRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    info!(rows = rows.len(), "Loaded GDELT events");
    Ok(rows)
}

/// Number of rows whose event id already appeared on an earlier row.
///
/// Three rows sharing one id count as two duplicates.
pub fn count_duplicate_ids(rows: &[EventRow]) -> usize {
    rows.iter()
        .map(|row| row.event_id.as_str())
        .counts()
        .values()
        .map(|n| n - 1)
        .sum()
}
