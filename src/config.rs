//! Runtime settings resolved from CLI flags, an optional YAML file and defaults.
//!
//! Precedence, highest first: command-line flag or its environment variable,
//! config file, built-in default.
//!
//! ```yaml
//! input: exports/url_GDELT.csv
//! output_dir: dumps
//! partitions: 4
//! timeout_secs: 10
//! id_prefix: ID
//! limit: 20
//! ```

use crate::cli::Cli;
use crate::dispatcher::default_partition_count;
use crate::filter::DEFAULT_ID_PREFIX;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_INPUT: &str = "url_GDELT.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Contents of the optional YAML config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub partitions: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub id_prefix: Option<String>,
    pub limit: Option<usize>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration");
        Ok(config)
    }
}

/// Fully resolved settings threaded through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Always at least 1.
    pub partitions: usize,
    pub timeout: Duration,
    pub id_prefix: String,
    pub limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            partitions: default_partition_count(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            limit: None,
        }
    }
}

impl Settings {
    /// Resolve settings for this run, reading the config file named by `--config`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    /// Layer CLI values over file values over defaults.
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let defaults = Settings::default();
        let partitions = cli
            .partitions
            .or(file.partitions)
            .unwrap_or(defaults.partitions)
            .max(1);

        Self {
            input: cli
                .input
                .as_ref()
                .map(PathBuf::from)
                .or(file.input)
                .unwrap_or(defaults.input),
            output_dir: cli
                .output_dir
                .as_ref()
                .map(PathBuf::from)
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            partitions,
            timeout: cli
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            id_prefix: cli
                .id_prefix
                .clone()
                .or(file.id_prefix)
                .unwrap_or(defaults.id_prefix),
            limit: cli.limit.or(file.limit),
        }
    }
}
