use crate::config::Config;
use crate::generate::{generate_logs, GenerateError, GenerateOptions};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateCliError {
    #[error("invalid start date '{0}' (expected YYYY-MM-DD)")]
    BadStartDate(String),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Number of days to generate
    #[arg(long, default_value_t = 90)]
    pub days: u32,

    /// Number of log rows per day
    #[arg(long = "logs-per-day", default_value_t = 50_000)]
    pub logs_per_day: u64,

    /// First date to generate (YYYY-MM-DD)
    #[arg(long = "start-date", default_value = "2025-01-01")]
    pub start_date: String,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output directory (defaults to the configured logs directory)
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,
}

pub async fn run(args: GenerateArgs, config: Config) -> Result<(), GenerateCliError> {
    let start_date = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d")
        .map_err(|_| GenerateCliError::BadStartDate(args.start_date.clone()))?;

    let opts = GenerateOptions {
        days: args.days,
        logs_per_day: args.logs_per_day,
        start_date,
        threads: args.threads.unwrap_or(config.threads).max(1),
        output_dir: args.output_dir.unwrap_or(config.logs_dir),
    };

    let summary = generate_logs(&opts).await?;
    println!(
        "Generated {} rows across {} files in {}",
        summary.rows_written,
        summary.files_written,
        opts.output_dir.display()
    );
    Ok(())
}
