use crate::query::Query;
use crate::source::record::LogRecord;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Per-file row counters, folded into the run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Rows the CSV reader produced, well-formed or not.
    pub rows_read: u64,
    /// Rows that parsed and passed every filter.
    pub rows_matched: u64,
    /// Rows skipped for wrong field count, bad timestamp, or bad metric.
    pub parse_errors: u64,
}

/// Streams filtered records out of one log file.
///
/// Rows outside the query's time range or allow-lists are dropped silently;
/// malformed rows are dropped and counted. Neither aborts the file.
pub struct LogFileReader<'q> {
    reader: csv::Reader<File>,
    query: &'q Query,
    stats: FileStats,
    buffer: csv::StringRecord,
}

impl<'q> LogFileReader<'q> {
    pub fn open(path: &Path, query: &'q Query) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        Ok(Self {
            reader,
            query,
            stats: FileStats::default(),
            buffer: csv::StringRecord::new(),
        })
    }

    /// Read the next record that survives parsing and filtering, or `None`
    /// at end of file.
    pub fn next_record(&mut self) -> Option<LogRecord> {
        loop {
            match self.reader.read_record(&mut self.buffer) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => {
                    self.stats.rows_read += 1;
                    self.stats.parse_errors += 1;
                    debug!(error = %e, "skipping unreadable CSV row");
                    // An I/O error will not clear on retry; stop the file.
                    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                        return None;
                    }
                    continue;
                }
            }

            self.stats.rows_read += 1;

            let record = match LogRecord::parse(&self.buffer) {
                Ok(record) => record,
                Err(e) => {
                    self.stats.parse_errors += 1;
                    debug!(error = %e, "skipping malformed row");
                    continue;
                }
            };

            if !self
                .query
                .matches(record.timestamp, &record.user, &record.app)
            {
                continue;
            }

            self.stats.rows_matched += 1;
            return Some(record);
        }
    }

    pub fn stats(&self) -> FileStats {
        self.stats
    }
}
