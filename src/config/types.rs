use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool-level defaults, overridable per invocation by CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory of day-partitioned input files (`YYYY-MM-DD.log.csv`).
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Directory result files are written to.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Worker threads for aggregation and generation.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: default_logs_dir(),
            results_dir: default_results_dir(),
            threads: default_threads(),
        }
    }
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("csv_logs")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_threads() -> usize {
    crate::agg::runner::DEFAULT_THREADS
}
