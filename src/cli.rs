//! Command-line interface definitions for the GDELT text dumper.
//!
//! Every option can also come from an environment variable or the optional
//! YAML config file; see [`crate::config::Settings`] for the precedence rules.

use clap::Parser;

/// Command-line arguments.
///
/// Options left unset fall back to the config file, then to built-in defaults.
///
/// # Examples
///
/// ```sh
/// # Read ./url_GDELT.csv and write the dumps next to it
/// gdelt_text_dump
///
/// # Explicit paths, four partitions, only the first 20 rows
/// gdelt_text_dump -i exports/url_GDELT.csv -o dumps -p 4 --limit 20
///
/// # Settings from a YAML file
/// gdelt_text_dump --config gdelt.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// GDELT CSV export with `globaleventid` and `sourceurl` columns [default: url_GDELT.csv]
    #[arg(short, long, env = "GDELT_INPUT")]
    pub input: Option<String>,

    /// Directory the `<event_id>.txt` files are written to [default: .]
    #[arg(short, long, env = "GDELT_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of partitions processed in parallel [default: available cores - 1]
    #[arg(short, long, env = "GDELT_PARTITIONS")]
    pub partitions: Option<usize>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(short, long, env = "GDELT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Prefix prepended to event ids to form file names [default: ID]
    #[arg(long)]
    pub id_prefix: Option<String>,

    /// Only process the first N cleaned rows (handy for test runs)
    #[arg(short, long)]
    pub limit: Option<usize>,
}
