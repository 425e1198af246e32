//! Plain-text article dumps.
//!
//! Every surviving event row becomes one file in the output directory:
//! ```text
//! output_dir/
//! ├── ID812345.txt
//! └── ID812346.txt
//! ```
//! with the contents
//! ```text
//! publication date: 2019-03-01 00:00:00
//! <article body>
//! ```
//! Existing files are overwritten, so reruns are idempotent for unchanged input.

use crate::models::ArticleRecord;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Whether `name` can be used as a file name directly inside the output directory.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Path of the dump for `event_id` inside `output_dir`.
pub fn article_path(output_dir: &Path, event_id: &str) -> PathBuf {
    output_dir.join(format!("{event_id}.txt"))
}

/// Write an [`ArticleRecord`] to `<output_dir>/<event_id>.txt`.
///
/// # Returns
///
/// The path that was written.
#[instrument(level = "debug", skip_all, fields(event_id = %record.event_id))]
pub async fn write_article(output_dir: &Path, record: &ArticleRecord) -> io::Result<PathBuf> {
    let path = article_path(output_dir, &record.event_id);
    fs::write(&path, record.render()).await?;
    debug!(path = %path.display(), bytes = record.body_text.len(), "Wrote article text");
    Ok(path)
}
