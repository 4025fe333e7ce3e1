use crate::agg::{self, GroupBy};
use crate::config::Config;
use crate::output;
use crate::query::{Granularity, Query, QueryError};
use clap::Args;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("aggregation failed: {0}")]
    Run(#[from] agg::RunError),

    #[error("failed to write results: {0}")]
    Write(#[from] output::WriteError),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Start datetime (YYYY-MM-DD HH:MM:SS), inclusive
    #[arg(long = "from-datetime", alias = "from_datetime")]
    pub from_datetime: String,

    /// End datetime (YYYY-MM-DD HH:MM:SS), inclusive
    #[arg(long = "to-datetime", alias = "to_datetime")]
    pub to_datetime: String,

    /// Aggregation granularity: 30m or 1day
    #[arg(long)]
    pub granularity: String,

    /// Dimensions to group by: user, app, or a comma-separated combination
    #[arg(long)]
    pub dimensions: String,

    /// Filter by user(s), comma-separated
    #[arg(long)]
    pub user: Option<String>,

    /// Filter by app(s), comma-separated
    #[arg(long)]
    pub app: Option<String>,

    /// Output filename (auto-incremented if it already exists)
    #[arg(long, default_value = "result.csv")]
    pub output: String,

    /// Number of worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Override the configured logs directory
    #[arg(long)]
    pub logs_dir: Option<PathBuf>,

    /// Override the configured results directory
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

impl QueryArgs {
    /// Validate the raw flag values into a `Query`. All parsing lives here;
    /// the aggregation core only ever sees a validated query.
    pub fn to_query(&self) -> Result<Query, QueryError> {
        Query::new(
            Query::parse_datetime(&self.from_datetime)?,
            Query::parse_datetime(&self.to_datetime)?,
            Granularity::parse(&self.granularity)?,
            Query::parse_dimensions(&self.dimensions)?,
            Query::parse_filter(self.user.as_deref()),
            Query::parse_filter(self.app.as_deref()),
        )
    }
}

pub async fn run(args: QueryArgs, config: Config) -> Result<(), RunError> {
    let query = args.to_query()?;
    let logs_dir = args.logs_dir.as_ref().unwrap_or(&config.logs_dir);
    let results_dir = args.results_dir.as_ref().unwrap_or(&config.results_dir);
    let threads = args.threads.unwrap_or(config.threads).max(1);

    info!(
        from = %query.from_time,
        to = %query.to_time,
        granularity = ?query.granularity,
        dimensions = ?query.dimensions,
        threads,
        "running query"
    );

    let (result, stats) = agg::run_query(logs_dir, &query, threads).await?;

    let output_name = output::next_output_name(results_dir, &args.output);
    let output_path = results_dir.join(&output_name);
    let group_by = GroupBy::from_dimensions(&query.dimensions);
    output::write_results(&result, group_by, &output_path)?;

    println!(
        "Rows read: {} | matched: {} | parse errors: {} | files skipped: {}",
        stats.rows_read, stats.rows_matched, stats.parse_errors, stats.files_skipped
    );
    println!("Results saved to: {}", output_path.display());
    Ok(())
}
