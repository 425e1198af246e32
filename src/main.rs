//! # GDELT Text Dump
//!
//! Downloads the news articles referenced by a GDELT event export, extracts
//! their body text and publication date, and writes one text file per event.
//!
//! ## Usage
//!
//! ```sh
//! gdelt_text_dump -i url_GDELT.csv -o ./articles
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Loading**: Read `globaleventid` / `sourceurl` pairs from the CSV export
//! 2. **Cleaning**: Keep `http(s)` rows and prefix event ids (`ID812345`)
//! 3. **Dispatch**: Split rows into contiguous partitions, one tokio task each
//! 4. **Fetch-extract**: Per row, download the page, extract text and date and
//!    write `<output_dir>/<event_id>.txt`; failures are logged and skipped

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dispatcher;
mod filter;
mod loader;
mod models;
mod outputs;
mod scrapers;
mod utils;
mod worker;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::Settings;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gdelt_text_dump starting up");

    // Parse CLI and resolve settings
    let args = Cli::parse();
    let settings = Settings::from_cli(&args)?;
    debug!(?settings, "Resolved settings");

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Load and clean events ----
    let events = loader::load_events(&settings.input)?;
    let duplicates = loader::count_duplicate_ids(&events);
    info!(duplicates, "Duplicate globaleventid values in input");

    let events = filter::clean_events(events, &settings.id_prefix);
    let events = filter::limit_rows(events, settings.limit);

    // ---- Fetch, extract and persist in parallel partitions ----
    let summary = dispatcher::dispatch(events, &settings).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        written = summary.written,
        skipped = summary.skipped,
        failed_partitions = summary.failed_partitions,
        output_dir = %settings.output_dir.display(),
        "Execution complete"
    );
    debug!(summary = %summary.to_json()?, "Run summary");
    println!("Task completed");

    Ok(())
}
