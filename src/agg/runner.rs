use crate::agg::{merge, AggregateResult, Aggregator, Partial};
use crate::query::Query;
use crate::source::discover::discover_files;
use crate::source::reader::{FileStats, LogFileReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_THREADS: usize = 4;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to list log directory '{path}': {source}")]
    Discover {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// End-of-run summary across all workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_read: u64,
    pub rows_matched: u64,
    pub parse_errors: u64,
    pub files_processed: u64,
    pub files_skipped: u64,
}

impl RunStats {
    fn absorb_file(&mut self, file: FileStats) {
        self.rows_read += file.rows_read;
        self.rows_matched += file.rows_matched;
        self.parse_errors += file.parse_errors;
    }

    fn absorb(&mut self, other: RunStats) {
        self.rows_read += other.rows_read;
        self.rows_matched += other.rows_matched;
        self.parse_errors += other.parse_errors;
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
    }
}

/// Run one aggregation query over the log directory.
///
/// Candidate files are selected by filename date, split round-robin across
/// `threads` workers, and each worker aggregates its shard into a private
/// partial map with no shared state. Workers are joined before the single
/// merge pass, so the result is deterministic for any thread count.
pub async fn run_query(
    logs_dir: &Path,
    query: &Query,
    threads: usize,
) -> Result<(AggregateResult, RunStats), RunError> {
    let files = discover_files(logs_dir, query.from_time.date(), query.to_time.date()).map_err(
        |source| RunError::Discover {
            path: logs_dir.to_path_buf(),
            source,
        },
    )?;

    if files.is_empty() {
        info!(
            logs_dir = %logs_dir.display(),
            from = %query.from_time.date(),
            to = %query.to_time.date(),
            "no log files in requested date range"
        );
        return Ok((AggregateResult::default(), RunStats::default()));
    }

    let workers = threads.max(1).min(files.len());
    debug!(files = files.len(), workers, "partitioning files across workers");

    let mut shards: Vec<Vec<PathBuf>> = vec![Vec::new(); workers];
    for (i, file) in files.into_iter().enumerate() {
        shards[i % workers].push(file);
    }

    let mut handles = Vec::with_capacity(workers);
    for shard in shards {
        let query = query.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            aggregate_shard(&shard, &query)
        }));
    }

    let mut partials = Vec::with_capacity(workers);
    let mut stats = RunStats::default();
    for handle in handles {
        let (partial, shard_stats) = handle.await?;
        partials.push(partial);
        stats.absorb(shard_stats);
    }

    let result = merge(partials);
    info!(
        rows_read = stats.rows_read,
        rows_matched = stats.rows_matched,
        parse_errors = stats.parse_errors,
        files_processed = stats.files_processed,
        files_skipped = stats.files_skipped,
        output_rows = result.len(),
        "aggregation complete"
    );

    Ok((result, stats))
}

/// Aggregate one worker's file shard. Reader and aggregator run fused: each
/// record is bucketed as it is read, never buffered.
pub fn aggregate_shard(files: &[PathBuf], query: &Query) -> (Partial, RunStats) {
    let mut agg = Aggregator::new(query);
    let mut stats = RunStats::default();

    for path in files {
        match LogFileReader::open(path, query) {
            Ok(mut reader) => {
                while let Some(record) = reader.next_record() {
                    agg.observe(&record);
                }
                stats.absorb_file(reader.stats());
                stats.files_processed += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable log file");
                stats.files_skipped += 1;
            }
        }
    }

    (agg.into_partial(), stats)
}
